#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the environmental monitor.
//!
//! - `Config` and its sections are deserialized from TOML and validated with
//!   `Config::validate`.
//! - Only `[pins]` is mandatory; every other section falls back to the
//!   defaults of the reference wiring (12-bit ADC, 3 s reports, 50 ms tick).
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Pins {
    pub relay: u8,
    pub button: u8,
    pub led_green: u8,
    pub led_amber: u8,
    pub led_red: u8,
    pub buzzer: u8,
    /// Optional "ventilation active" indicator mirroring the relay.
    #[serde(default)]
    pub vent: Option<u8>,
    /// ADC channel of the temperature source (analog kind only).
    #[serde(default)]
    pub temp_channel: u8,
    #[serde(default = "default_light_channel")]
    pub light_channel: u8,
    #[serde(default = "default_setpoint_channel")]
    pub setpoint_channel: u8,
}

fn default_light_channel() -> u8 {
    1
}

fn default_setpoint_channel() -> u8 {
    2
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// Averaged ADC reading scaled linearly (potentiometer / LM35 style).
    #[default]
    Analog,
    /// Digital probe that reports Celsius directly.
    Probe,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorCfg {
    pub kind: SensorKind,
    /// Raw samples averaged per reading.
    pub samples: u16,
    /// Delay between two raw samples (ms).
    pub sample_delay_ms: u64,
    /// Full-scale raw count of the ADC (4095 for 12-bit).
    pub max_raw: u16,
    /// Engineering span mapped onto `0..=max_raw` (°C).
    pub temp_span_c: f32,
    pub temp_offset_c: f32,
    /// Substituted when the temperature source reports a transient fault.
    pub fallback_c: f32,
    /// 1-Wire sysfs file of the probe (`.../w1_slave`), probe kind only.
    pub probe_path: Option<String>,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            kind: SensorKind::Analog,
            samples: 10,
            sample_delay_ms: 1,
            max_raw: 4095,
            temp_span_c: 50.0,
            temp_offset_c: 0.0,
            fallback_c: 25.0,
            probe_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SetpointCfg {
    pub min_c: i32,
    pub max_c: i32,
}

impl Default for SetpointCfg {
    fn default() -> Self {
        Self {
            min_c: 20,
            max_c: 60,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TimingCfg {
    /// Period of the slow report branch (ms).
    pub report_interval_ms: u64,
    /// Cooperative yield at the end of every tick (ms).
    pub tick_ms: u64,
    /// Quiet window after an accepted button edge (ms).
    pub debounce_ms: u64,
    /// Pause between start-up banner and the first tick (ms).
    pub startup_delay_ms: u64,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            report_interval_ms: 3000,
            tick_ms: 50,
            debounce_ms: 300,
            startup_delay_ms: 2000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InitialMode {
    #[default]
    Automatic,
    Manual,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DebounceMode {
    /// Skip edge evaluation until the quiet window elapses; the loop keeps
    /// ticking.
    #[default]
    Gated,
    /// Sleep the whole quiet window after a toggle.
    Blocking,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ButtonCfg {
    /// Pressed reads low (internal pull-up). False for an external
    /// pull-down where pressed reads high.
    pub active_low: bool,
    pub initial_mode: InitialMode,
    pub debounce: DebounceMode,
}

impl Default for ButtonCfg {
    fn default() -> Self {
        Self {
            active_low: true,
            initial_mode: InitialMode::Automatic,
            debounce: DebounceMode::Gated,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BuzzerCfg {
    /// PWM duty while chirping (10-bit scale, 512 = 50 %).
    pub duty: u16,
    pub pulse_ms: u64,
    pub frequency_hz: u32,
}

impl Default for BuzzerCfg {
    fn default() -> Self {
        Self {
            duty: 512,
            pulse_ms: 100,
            frequency_hz: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// Inputs of the simulated backend. Ignored by hardware builds.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationCfg {
    /// Temperature sweeps linearly between these bounds and back (°C).
    pub temp_min_c: f32,
    pub temp_max_c: f32,
    /// Duration of one full min -> max -> min sweep (ms). 0 holds `temp_min_c`.
    pub temp_period_ms: u64,
    pub setpoint_raw: u16,
    pub light_raw: u16,
    /// Press the button every N ms (0 disables).
    pub button_every_ms: u64,
    /// How long each simulated press is held (ms).
    pub button_hold_ms: u64,
    /// Every Nth probe read fails (0 disables). Probe kind only.
    pub probe_fault_every: u32,
}

impl Default for SimulationCfg {
    fn default() -> Self {
        Self {
            temp_min_c: 18.0,
            temp_max_c: 36.0,
            temp_period_ms: 60_000,
            setpoint_raw: 512,
            light_raw: 2048,
            button_every_ms: 0,
            button_hold_ms: 150,
            probe_fault_every: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub sensor: SensorCfg,
    #[serde(default)]
    pub setpoint: SetpointCfg,
    #[serde(default)]
    pub timing: TimingCfg,
    #[serde(default)]
    pub button: ButtonCfg,
    #[serde(default)]
    pub buzzer: BuzzerCfg,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub simulation: SimulationCfg,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {}", path.display(), e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {}: {}", path.display(), e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sensor
        if self.sensor.samples == 0 {
            eyre::bail!("sensor.samples must be >= 1");
        }
        if self.sensor.sample_delay_ms > 100 {
            eyre::bail!("sensor.sample_delay_ms is unreasonably large (>100ms)");
        }
        if self.sensor.max_raw == 0 {
            eyre::bail!("sensor.max_raw must be > 0");
        }
        if !self.sensor.temp_span_c.is_finite() || self.sensor.temp_span_c <= 0.0 {
            eyre::bail!("sensor.temp_span_c must be finite and > 0");
        }
        if !self.sensor.temp_offset_c.is_finite() {
            eyre::bail!("sensor.temp_offset_c must be finite");
        }
        if !self.sensor.fallback_c.is_finite() {
            eyre::bail!("sensor.fallback_c must be finite");
        }
        if let Some(p) = &self.sensor.probe_path
            && p.trim().is_empty()
        {
            eyre::bail!("sensor.probe_path must not be empty");
        }

        // Setpoint
        if self.setpoint.min_c >= self.setpoint.max_c {
            eyre::bail!("setpoint.min_c must be < setpoint.max_c");
        }

        // Timing
        if self.timing.report_interval_ms == 0 {
            eyre::bail!("timing.report_interval_ms must be >= 1");
        }
        if self.timing.tick_ms == 0 {
            eyre::bail!("timing.tick_ms must be >= 1");
        }
        if self.timing.tick_ms > self.timing.report_interval_ms {
            eyre::bail!("timing.tick_ms must be <= timing.report_interval_ms");
        }
        if self.timing.debounce_ms > 5_000 {
            eyre::bail!("timing.debounce_ms is unreasonably large (>5s)");
        }
        if self.timing.startup_delay_ms > 60_000 {
            eyre::bail!("timing.startup_delay_ms is unreasonably large (>60s)");
        }

        // Buzzer
        if self.buzzer.duty > 1023 {
            eyre::bail!("buzzer.duty must be in [0, 1023]");
        }
        if self.buzzer.pulse_ms > 1_000 {
            eyre::bail!("buzzer.pulse_ms is unreasonably large (>1s)");
        }
        if self.buzzer.frequency_hz == 0 {
            eyre::bail!("buzzer.frequency_hz must be > 0");
        }

        // Simulation
        let sim = &self.simulation;
        if !(sim.temp_min_c.is_finite() && sim.temp_max_c.is_finite()) {
            eyre::bail!("simulation.temp_min_c/temp_max_c must be finite");
        }
        if sim.temp_min_c > sim.temp_max_c {
            eyre::bail!("simulation.temp_min_c must be <= simulation.temp_max_c");
        }
        if sim.setpoint_raw > self.sensor.max_raw || sim.light_raw > self.sensor.max_raw {
            eyre::bail!("simulation raw values must be <= sensor.max_raw");
        }
        if sim.button_every_ms > 0 && sim.button_hold_ms >= sim.button_every_ms {
            eyre::bail!("simulation.button_hold_ms must be < simulation.button_every_ms");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
