//! The control loop body.
//!
//! `Monitor::tick` runs one cooperative iteration in a fixed order:
//!
//! 1. read the monotonic time;
//! 2. slow branch, once per report interval: verbose sensor read, classify,
//!    drive indicators, count the reading, emit a snapshot;
//! 3. fast branch, every tick: silent temperature/setpoint read, relay;
//! 4. mode button edge detection;
//! 5. yield one tick through the clock.
//!
//! Sensor faults never leave the loop: temperature falls back to the
//! configured constant, light and setpoint keep their last good value.

use std::sync::Arc;
use std::time::{Duration, Instant};

use envmon_traits::{Clock, DigitalInput};

use crate::classifier::{Indicators, Status, classify};
use crate::config::MonitorCfg;
use crate::error::SensorFault;
use crate::hw_error::map_sensor_fault;
use crate::mode_switch::{DebounceStrategy, DebounceWindow, ModeSwitch, OperatingMode};
use crate::relay::RelayController;
use crate::report::{Reporter, Snapshot};
use crate::sensor::Sensors;
use crate::state::{ControllerState, LoopClock};
use crate::util::celsius_to_fahrenheit;

pub struct Monitor {
    pub(crate) sensors: Sensors,
    pub(crate) indicators: Indicators,
    pub(crate) relay: RelayController,
    pub(crate) button: Box<dyn DigitalInput>,
    pub(crate) mode_switch: ModeSwitch,
    pub(crate) reporter: Box<dyn Reporter>,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) cfg: MonitorCfg,
    pub(crate) state: ControllerState,
    pub(crate) epoch: Instant,
    pub(crate) shut_down: bool,
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("mode", &self.state.mode)
            .field("readings", &self.state.readings)
            .field("ticks", &self.state.ticks)
            .field("relay_on", &self.relay.is_on())
            .field("shut_down", &self.shut_down)
            .finish()
    }
}

impl Monitor {
    pub(crate) fn assemble(
        sensors: Sensors,
        indicators: Indicators,
        relay: RelayController,
        button: Box<dyn DigitalInput>,
        reporter: Box<dyn Reporter>,
        clock: Arc<dyn Clock + Send + Sync>,
        cfg: MonitorCfg,
    ) -> Self {
        let mode_switch = ModeSwitch::new(
            cfg.button.polarity,
            cfg.button.debounce,
            cfg.timing.debounce_ms,
        );
        let epoch = clock.now();
        // 25 °C dial position until the first good read
        let initial_setpoint = cfg.setpoint.clamp(25);
        let state = ControllerState::new(
            cfg.button.initial_mode,
            DebounceWindow::new(cfg.button.polarity.idle_level()),
            LoopClock::new(0, cfg.timing.report_interval_ms),
            initial_setpoint,
        );
        Self {
            sensors,
            indicators,
            relay,
            button,
            mode_switch,
            reporter,
            clock,
            cfg,
            state,
            epoch,
            shut_down: false,
        }
    }

    /// Start a builder.
    pub fn builder() -> crate::builder::MonitorBuilder {
        crate::builder::MonitorBuilder::default()
    }

    /// Reset the loop epoch to now. The first report fires one interval
    /// later.
    pub fn begin(&mut self) {
        self.epoch = self.clock.now();
        self.state.loop_clock.restart(0);
        tracing::info!(
            mode = %self.state.mode,
            report_interval_ms = self.cfg.timing.report_interval_ms,
            tick_ms = self.cfg.timing.tick_ms,
            "monitor started"
        );
    }

    /// One loop iteration, including the end-of-tick yield.
    pub fn tick(&mut self) {
        let now_ms = self.uptime_ms();

        if self.state.loop_clock.poll(now_ms) {
            self.report_cycle(now_ms);
        }

        self.control_cycle();
        self.poll_button();

        self.clock
            .sleep(Duration::from_millis(self.cfg.timing.tick_ms));
        self.state.ticks = self.state.ticks.saturating_add(1);
    }

    /// Drive every output to its safe state and return the number of
    /// completed reporting cycles. Runs once; later calls only return the
    /// tally.
    pub fn shutdown(&mut self) -> u64 {
        if self.shut_down {
            return self.state.readings;
        }
        self.shut_down = true;
        self.relay.de_energize();
        self.indicators.all_off();
        tracing::info!(readings = self.state.readings, "outputs de-energized");
        self.state.readings
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn mode(&self) -> OperatingMode {
        self.state.mode
    }

    pub fn readings(&self) -> u64 {
        self.state.readings
    }

    pub fn relay_on(&self) -> bool {
        self.relay.is_on()
    }

    pub fn lit(&self) -> Option<Status> {
        self.indicators.lit()
    }

    pub fn config(&self) -> &MonitorCfg {
        &self.cfg
    }

    pub fn clock(&self) -> &(dyn Clock + Send + Sync) {
        self.clock.as_ref()
    }

    /// Milliseconds since `begin` (or construction).
    pub fn uptime_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    fn report_cycle(&mut self, now_ms: u64) {
        let temp_c = self.read_temperature();
        let light = match self.sensors.light(self.clock.as_ref()) {
            Ok(l) => {
                self.state.last_light = l;
                l
            }
            Err(fault) => {
                warn_fault("light", &fault);
                self.state.last_light
            }
        };
        let setpoint = self.read_setpoint();
        tracing::debug!(temp_c, light, setpoint, "sensor readings");

        let (status, actuators) = classify(temp_c, setpoint);
        self.indicators.apply(&actuators, self.clock.as_ref());
        self.state.status = status;
        self.state.actuators = actuators;
        self.state.readings = self.state.readings.saturating_add(1);

        let snapshot = Snapshot {
            reading_number: self.state.readings,
            temp_c,
            temp_f: celsius_to_fahrenheit(temp_c),
            light,
            setpoint,
            status,
            relay_on: self.relay.is_on(),
            mode: self.state.mode,
            uptime_ms: now_ms,
        };
        self.reporter.report(&snapshot);
    }

    fn control_cycle(&mut self) {
        let temp_c = self.read_temperature();
        let setpoint = self.read_setpoint();
        self.relay.update(temp_c, setpoint, self.state.mode);
        self.state.actuators.relay = self.relay.is_on();
    }

    fn poll_button(&mut self) {
        let level = match self.button.is_high() {
            Ok(level) => level,
            Err(e) => {
                warn_fault("button", &map_sensor_fault(&*e));
                self.cfg.button.polarity.idle_level()
            }
        };
        let now_ms = self.uptime_ms();
        if !self
            .mode_switch
            .poll(&mut self.state.debounce, level, now_ms)
        {
            return;
        }

        self.state.mode = self.state.mode.toggled();
        tracing::info!(mode = %self.state.mode, "mode switched");
        if self.state.mode == OperatingMode::Manual {
            self.relay.force_off();
        }
        if self.mode_switch.strategy() == DebounceStrategy::Blocking {
            self.clock
                .sleep(Duration::from_millis(self.mode_switch.quiet_ms()));
        }
    }

    fn read_temperature(&mut self) -> f32 {
        match self.sensors.temperature(self.clock.as_ref()) {
            Ok(r) => r.value,
            Err(fault) => {
                warn_fault("temperature", &fault);
                self.cfg.sensor.fallback_c
            }
        }
    }

    fn read_setpoint(&mut self) -> i32 {
        match self.sensors.setpoint(self.clock.as_ref()) {
            Ok(sp) => {
                self.state.last_setpoint = sp;
                sp
            }
            Err(fault) => {
                warn_fault("setpoint", &fault);
                self.state.last_setpoint
            }
        }
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn warn_fault(sensor: &'static str, fault: &SensorFault) {
    tracing::warn!(sensor, error = %fault, "sensor fault, using fallback");
}
