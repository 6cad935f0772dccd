//! Builder for `Monitor`.
//!
//! Every capability is boxed so hardware and simulated backends can be mixed
//! freely. `try_build()` checks that all required inputs and outputs were
//! provided and that the runtime configuration is usable.

use std::sync::Arc;
use std::time::Duration;

use envmon_traits::{
    AnalogInput, Clock, DigitalInput, DigitalOutput, MonotonicClock, PwmOutput, TemperatureProbe,
};

use crate::classifier::Indicators;
use crate::config::MonitorCfg;
use crate::error::{BuildError, Result};
use crate::monitor::Monitor;
use crate::relay::RelayController;
use crate::report::{Reporter, TracingReporter};
use crate::sensor::{Sensors, TemperatureSource};

/// Highest duty accepted by the buzzer (10-bit PWM).
pub const MAX_BUZZER_DUTY: u16 = 1023;

enum TempInput {
    Analog(Box<dyn AnalogInput>),
    Probe(Box<dyn TemperatureProbe>),
}

/// Builder for `Monitor`. Validated on `try_build()`.
#[derive(Default)]
pub struct MonitorBuilder {
    temperature: Option<TempInput>,
    light: Option<Box<dyn AnalogInput>>,
    setpoint: Option<Box<dyn AnalogInput>>,
    button: Option<Box<dyn DigitalInput>>,
    green: Option<Box<dyn DigitalOutput>>,
    amber: Option<Box<dyn DigitalOutput>>,
    red: Option<Box<dyn DigitalOutput>>,
    buzzer: Option<Box<dyn PwmOutput>>,
    relay: Option<Box<dyn DigitalOutput>>,
    vent: Option<Box<dyn DigitalOutput>>,
    reporter: Option<Box<dyn Reporter>>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    cfg: Option<MonitorCfg>,
}

impl MonitorBuilder {
    /// Analog temperature channel, scaled with `cfg.sensor.temp_map`.
    pub fn with_temperature_adc(mut self, input: impl AnalogInput + 'static) -> Self {
        self.temperature = Some(TempInput::Analog(Box::new(input)));
        self
    }

    /// Digital probe reporting °C.
    pub fn with_temperature_probe(mut self, probe: impl TemperatureProbe + 'static) -> Self {
        self.temperature = Some(TempInput::Probe(Box::new(probe)));
        self
    }

    pub fn with_light(mut self, input: impl AnalogInput + 'static) -> Self {
        self.light = Some(Box::new(input));
        self
    }

    pub fn with_setpoint(mut self, input: impl AnalogInput + 'static) -> Self {
        self.setpoint = Some(Box::new(input));
        self
    }

    pub fn with_button(mut self, input: impl DigitalInput + 'static) -> Self {
        self.button = Some(Box::new(input));
        self
    }

    pub fn with_indicators(
        mut self,
        green: impl DigitalOutput + 'static,
        amber: impl DigitalOutput + 'static,
        red: impl DigitalOutput + 'static,
        buzzer: impl PwmOutput + 'static,
    ) -> Self {
        self.green = Some(Box::new(green));
        self.amber = Some(Box::new(amber));
        self.red = Some(Box::new(red));
        self.buzzer = Some(Box::new(buzzer));
        self
    }

    pub fn with_relay(mut self, relay: impl DigitalOutput + 'static) -> Self {
        self.relay = Some(Box::new(relay));
        self
    }

    /// Optional lamp mirroring the relay.
    pub fn with_vent(mut self, vent: impl DigitalOutput + 'static) -> Self {
        self.vent = Some(Box::new(vent));
        self
    }

    /// Defaults to `TracingReporter`.
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    /// Defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn with_shared_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_config(mut self, cfg: MonitorCfg) -> Self {
        self.cfg = Some(cfg);
        self
    }

    pub fn try_build(self) -> Result<Monitor> {
        let cfg = self.cfg.unwrap_or_default();
        validate(&cfg)?;

        let temperature = match self.temperature.ok_or(BuildError::MissingTemperature)? {
            TempInput::Analog(input) => TemperatureSource::Analog {
                input,
                map: cfg.sensor.temp_map,
            },
            TempInput::Probe(probe) => TemperatureSource::Probe(probe),
        };
        let light = self.light.ok_or(BuildError::MissingLight)?;
        let setpoint = self.setpoint.ok_or(BuildError::MissingSetpoint)?;
        let button = self.button.ok_or(BuildError::MissingButton)?;
        let (Some(green), Some(amber), Some(red), Some(buzzer)) =
            (self.green, self.amber, self.red, self.buzzer)
        else {
            return Err(eyre::Report::new(BuildError::MissingIndicators));
        };
        let relay = self.relay.ok_or(BuildError::MissingRelay)?;

        let sensors = Sensors::new(
            temperature,
            light,
            setpoint,
            cfg.sensor.samples,
            Duration::from_millis(cfg.sensor.sample_delay_ms),
            cfg.sensor.max_raw,
            cfg.setpoint,
        );
        let indicators = Indicators::new(green, amber, red, buzzer, cfg.buzzer);
        let relay = RelayController::new(relay, self.vent);
        let reporter: Box<dyn Reporter> = match self.reporter {
            Some(r) => r,
            None => Box::new(TracingReporter),
        };
        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(c) => c,
            None => Arc::new(MonotonicClock::new()),
        };

        Ok(Monitor::assemble(
            sensors, indicators, relay, button, reporter, clock, cfg,
        ))
    }
}

fn validate(cfg: &MonitorCfg) -> Result<()> {
    if cfg.sensor.samples == 0 {
        return invalid("samples must be >= 1");
    }
    if cfg.sensor.max_raw == 0 || cfg.sensor.temp_map.max_raw == 0 {
        return invalid("max_raw must be > 0");
    }
    if !cfg.sensor.temp_map.span.is_finite() || !cfg.sensor.temp_map.offset.is_finite() {
        return invalid("temperature map must be finite");
    }
    if !cfg.sensor.fallback_c.is_finite() {
        return invalid("fallback_c must be finite");
    }
    if cfg.setpoint.min >= cfg.setpoint.max {
        return invalid("setpoint min must be < max");
    }
    if cfg.timing.report_interval_ms == 0 || cfg.timing.tick_ms == 0 {
        return invalid("intervals must be >= 1 ms");
    }
    if cfg.buzzer.duty > MAX_BUZZER_DUTY {
        return invalid("buzzer duty out of range");
    }
    Ok(())
}

fn invalid(msg: &'static str) -> Result<()> {
    Err(eyre::Report::new(BuildError::InvalidConfig(msg)))
}
