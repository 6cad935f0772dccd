//! `From` implementations bridging `envmon_config` types to `envmon_core` types.

use crate::config::{BuzzerCfg, ButtonCfg, MonitorCfg, SensorCfg, TimingCfg};
use crate::mode_switch::{ButtonPolarity, DebounceStrategy, OperatingMode};
use crate::sensor::{LinearMap, SetpointMap};

// ── Sensor ───────────────────────────────────────────────────────────────────

impl From<&envmon_config::SensorCfg> for SensorCfg {
    fn from(c: &envmon_config::SensorCfg) -> Self {
        Self {
            samples: c.samples,
            sample_delay_ms: c.sample_delay_ms,
            max_raw: c.max_raw,
            temp_map: LinearMap::new(c.max_raw, c.temp_span_c, c.temp_offset_c),
            fallback_c: c.fallback_c,
        }
    }
}

impl From<&envmon_config::SetpointCfg> for SetpointMap {
    fn from(c: &envmon_config::SetpointCfg) -> Self {
        Self {
            min: c.min_c,
            max: c.max_c,
        }
    }
}

// ── Timing ───────────────────────────────────────────────────────────────────

impl From<&envmon_config::TimingCfg> for TimingCfg {
    fn from(c: &envmon_config::TimingCfg) -> Self {
        Self {
            report_interval_ms: c.report_interval_ms,
            tick_ms: c.tick_ms,
            debounce_ms: c.debounce_ms,
        }
    }
}

// ── Button ───────────────────────────────────────────────────────────────────

impl From<envmon_config::InitialMode> for OperatingMode {
    fn from(m: envmon_config::InitialMode) -> Self {
        match m {
            envmon_config::InitialMode::Automatic => Self::Automatic,
            envmon_config::InitialMode::Manual => Self::Manual,
        }
    }
}

impl From<envmon_config::DebounceMode> for DebounceStrategy {
    fn from(m: envmon_config::DebounceMode) -> Self {
        match m {
            envmon_config::DebounceMode::Gated => Self::Gated,
            envmon_config::DebounceMode::Blocking => Self::Blocking,
        }
    }
}

impl From<&envmon_config::ButtonCfg> for ButtonCfg {
    fn from(c: &envmon_config::ButtonCfg) -> Self {
        Self {
            polarity: if c.active_low {
                ButtonPolarity::ActiveLow
            } else {
                ButtonPolarity::ActiveHigh
            },
            initial_mode: c.initial_mode.into(),
            debounce: c.debounce.into(),
        }
    }
}

// ── Buzzer ───────────────────────────────────────────────────────────────────

impl From<&envmon_config::BuzzerCfg> for BuzzerCfg {
    fn from(c: &envmon_config::BuzzerCfg) -> Self {
        Self {
            duty: c.duty,
            pulse_ms: c.pulse_ms,
        }
    }
}

// ── Whole config ─────────────────────────────────────────────────────────────

impl From<&envmon_config::Config> for MonitorCfg {
    fn from(c: &envmon_config::Config) -> Self {
        Self {
            sensor: (&c.sensor).into(),
            setpoint: (&c.setpoint).into(),
            timing: (&c.timing).into(),
            button: (&c.button).into(),
            buzzer: (&c.buzzer).into(),
        }
    }
}
