//! Hardware assembly: turns the `[pins]` / `[sensor]` / `[simulation]`
//! sections into boxed capabilities for the monitor.

use std::sync::Arc;

use envmon_config::{Config, SensorKind};
use envmon_core::{Monitor, MonitorCfg, Reporter};
use envmon_traits::{
    AnalogInput, Clock, DigitalInput, DigitalOutput, MonotonicClock, PwmOutput, TemperatureProbe,
};

pub enum TempDevice {
    Adc(Box<dyn AnalogInput>),
    Probe(Box<dyn TemperatureProbe>),
}

/// Every device the monitor needs, already opened.
pub struct Devices {
    pub backend: &'static str,
    pub temperature: TempDevice,
    pub light: Box<dyn AnalogInput>,
    pub setpoint: Box<dyn AnalogInput>,
    pub button: Box<dyn DigitalInput>,
    pub green: Box<dyn DigitalOutput>,
    pub amber: Box<dyn DigitalOutput>,
    pub red: Box<dyn DigitalOutput>,
    pub buzzer: Box<dyn PwmOutput>,
    pub relay: Box<dyn DigitalOutput>,
    pub vent: Option<Box<dyn DigitalOutput>>,
}

/// Open the simulated backend.
#[cfg(not(feature = "hardware"))]
pub fn open_devices(cfg: &Config, clock: &Arc<dyn Clock + Send + Sync>) -> eyre::Result<Devices> {
    use envmon_hardware::sim::raw_for_value;
    use envmon_hardware::{SimulatedAnalog, SimulatedButton, SimulatedPin, SimulatedProbe, SimulatedPwm};

    let sim = &cfg.simulation;
    let max_raw = cfg.sensor.max_raw;
    // a few counts of jitter so averaging has something to do
    let noise = (max_raw / 500).max(1);

    let temperature = match cfg.sensor.kind {
        SensorKind::Analog => {
            let lo = raw_for_value(sim.temp_min_c, cfg.sensor.temp_span_c, cfg.sensor.temp_offset_c, max_raw);
            let hi = raw_for_value(sim.temp_max_c, cfg.sensor.temp_span_c, cfg.sensor.temp_offset_c, max_raw);
            TempDevice::Adc(Box::new(
                SimulatedAnalog::sweep(lo, hi, sim.temp_period_ms, max_raw, clock.clone()).with_noise(noise),
            ))
        }
        SensorKind::Probe => match &cfg.sensor.probe_path {
            Some(path) => TempDevice::Probe(Box::new(envmon_hardware::W1Probe::new(path))),
            None => TempDevice::Probe(Box::new(
                SimulatedProbe::sweep(sim.temp_min_c, sim.temp_max_c, sim.temp_period_ms, clock.clone())
                    .with_fault_every(sim.probe_fault_every),
            )),
        },
    };

    let active_low = cfg.button.active_low;
    let button: Box<dyn DigitalInput> = if sim.button_every_ms > 0 {
        Box::new(SimulatedButton::scheduled(
            active_low,
            sim.button_every_ms,
            sim.button_hold_ms,
            clock.clone(),
        ))
    } else {
        Box::new(SimulatedButton::manual(active_low))
    };

    Ok(Devices {
        backend: "simulation",
        temperature,
        light: Box::new(SimulatedAnalog::fixed(sim.light_raw, max_raw).with_noise(noise)),
        setpoint: Box::new(SimulatedAnalog::fixed(sim.setpoint_raw, max_raw)),
        button,
        green: Box::new(SimulatedPin::new(format!("gpio{}", cfg.pins.led_green))),
        amber: Box::new(SimulatedPin::new(format!("gpio{}", cfg.pins.led_amber))),
        red: Box::new(SimulatedPin::new(format!("gpio{}", cfg.pins.led_red))),
        buzzer: Box::new(SimulatedPwm::new()),
        relay: Box::new(SimulatedPin::new(format!("gpio{}", cfg.pins.relay))),
        vent: cfg
            .pins
            .vent
            .map(|p| Box::new(SimulatedPin::new(format!("gpio{p}"))) as Box<dyn DigitalOutput>),
    })
}

/// Open the Raspberry Pi backend: GPIO lines, a software-PWM buzzer and an
/// MCP3008 on SPI0.
#[cfg(feature = "hardware")]
pub fn open_devices(cfg: &Config, _clock: &Arc<dyn Clock + Send + Sync>) -> eyre::Result<Devices> {
    use envmon_hardware::gpio::{GpioInput, GpioOutput, SoftPwm};
    use envmon_hardware::mcp3008::{MCP3008_MAX_RAW, Mcp3008};
    use eyre::WrapErr;

    if cfg.sensor.max_raw != MCP3008_MAX_RAW {
        eyre::bail!(
            "sensor.max_raw must be {MCP3008_MAX_RAW} for the MCP3008 (got {})",
            cfg.sensor.max_raw
        );
    }
    let pins = &cfg.pins;
    let gpio = envmon_hardware::gpio::open().wrap_err("open gpio")?;
    let adc = Mcp3008::open().wrap_err("open mcp3008")?;

    let temperature = match cfg.sensor.kind {
        SensorKind::Analog => TempDevice::Adc(Box::new(
            adc.channel(pins.temp_channel).wrap_err("open temperature channel")?,
        )),
        SensorKind::Probe => {
            let Some(path) = &cfg.sensor.probe_path else {
                eyre::bail!("sensor.probe_path is required when sensor.kind = \"probe\"");
            };
            TempDevice::Probe(Box::new(envmon_hardware::W1Probe::new(path)))
        }
    };
    let output = |bcm: u8, what: &str| -> eyre::Result<Box<dyn DigitalOutput>> {
        let pin: Box<dyn DigitalOutput> = Box::new(
            GpioOutput::new(&gpio, bcm).wrap_err_with(|| format!("open {what} pin {bcm}"))?,
        );
        Ok(pin)
    };

    Ok(Devices {
        backend: "raspberry-pi",
        temperature,
        light: Box::new(adc.channel(pins.light_channel).wrap_err("open light channel")?),
        setpoint: Box::new(adc.channel(pins.setpoint_channel).wrap_err("open setpoint channel")?),
        button: Box::new(
            GpioInput::new(&gpio, pins.button, cfg.button.active_low)
                .wrap_err_with(|| format!("open button pin {}", pins.button))?,
        ),
        green: output(pins.led_green, "green led")?,
        amber: output(pins.led_amber, "amber led")?,
        red: output(pins.led_red, "red led")?,
        buzzer: Box::new(
            SoftPwm::new(&gpio, pins.buzzer, cfg.buzzer.frequency_hz)
                .wrap_err_with(|| format!("open buzzer pin {}", pins.buzzer))?,
        ),
        relay: output(pins.relay, "relay")?,
        vent: pins.vent.map(|p| output(p, "vent")).transpose()?,
    })
}

/// Open the backend and assemble a `Monitor` reporting to `reporter`.
pub fn build_monitor(cfg: &Config, reporter: Box<dyn Reporter>) -> eyre::Result<Monitor> {
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(MonotonicClock::new());
    let devices = open_devices(cfg, &clock)?;
    tracing::info!(backend = devices.backend, "devices opened");

    let mut builder = Monitor::builder();
    builder = match devices.temperature {
        TempDevice::Adc(adc) => builder.with_temperature_adc(adc),
        TempDevice::Probe(probe) => builder.with_temperature_probe(probe),
    };
    builder = builder
        .with_light(devices.light)
        .with_setpoint(devices.setpoint)
        .with_button(devices.button)
        .with_indicators(devices.green, devices.amber, devices.red, devices.buzzer)
        .with_relay(devices.relay)
        .with_reporter(reporter)
        .with_shared_clock(clock)
        .with_config(MonitorCfg::from(cfg));
    if let Some(vent) = devices.vent {
        builder = builder.with_vent(vent);
    }
    builder.try_build()
}
