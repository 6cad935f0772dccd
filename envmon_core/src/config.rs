//! Runtime configuration used by `Monitor`.
//!
//! Separate from the TOML schema in `envmon_config`; see `conversions` for
//! the mapping.

use crate::mode_switch::{ButtonPolarity, DebounceStrategy, OperatingMode};
use crate::sensor::{LinearMap, SetpointMap};

/// Sensor sampling and scaling.
#[derive(Debug, Clone)]
pub struct SensorCfg {
    /// Raw samples averaged per reading.
    pub samples: u16,
    /// Delay after each raw sample (ms).
    pub sample_delay_ms: u64,
    /// Full-scale raw count shared by all analog channels.
    pub max_raw: u16,
    /// Raw count -> °C for an analog temperature source.
    pub temp_map: LinearMap,
    /// Substituted when the temperature source faults (°C).
    pub fallback_c: f32,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            samples: 10,
            sample_delay_ms: 1,
            max_raw: 4095,
            temp_map: LinearMap::new(4095, 50.0, 0.0),
            fallback_c: 25.0,
        }
    }
}

/// Loop cadence.
#[derive(Debug, Clone)]
pub struct TimingCfg {
    pub report_interval_ms: u64,
    pub tick_ms: u64,
    pub debounce_ms: u64,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            report_interval_ms: 3000,
            tick_ms: 50,
            debounce_ms: 300,
        }
    }
}

/// Mode button wiring and behaviour.
#[derive(Debug, Clone, Copy)]
pub struct ButtonCfg {
    pub polarity: ButtonPolarity,
    pub initial_mode: OperatingMode,
    pub debounce: DebounceStrategy,
}

impl Default for ButtonCfg {
    fn default() -> Self {
        Self {
            polarity: ButtonPolarity::ActiveLow,
            initial_mode: OperatingMode::Automatic,
            debounce: DebounceStrategy::Gated,
        }
    }
}

/// Critical-alarm chirp.
#[derive(Debug, Clone, Copy)]
pub struct BuzzerCfg {
    pub duty: u16,
    pub pulse_ms: u64,
}

impl Default for BuzzerCfg {
    fn default() -> Self {
        Self {
            duty: 512,
            pulse_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MonitorCfg {
    pub sensor: SensorCfg,
    pub setpoint: SetpointMap,
    pub timing: TimingCfg,
    pub button: ButtonCfg,
    pub buzzer: BuzzerCfg,
}
