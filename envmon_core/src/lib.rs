#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core monitoring logic (hardware-agnostic).
//!
//! All hardware interactions go through the capability traits in
//! `envmon_traits`; the loop itself is single-threaded and cooperative.
//!
//! ## Architecture
//!
//! - **Sensors**: averaged ADC reads, linear scaling, setpoint dial (`sensor`)
//! - **Classifier**: NORMAL / WARNING / CRITICAL and the LED ladder (`classifier`)
//! - **Relay**: bang-bang fan control gated by mode (`relay`)
//! - **Mode switch**: debounced button with configurable polarity (`mode_switch`)
//! - **Loop**: `Monitor::tick` and the run driver (`monitor`, `runner`)
//! - **Reporting**: snapshots and sinks (`report`)

pub mod builder;
pub mod classifier;
pub mod config;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod mode_switch;
pub mod monitor;
pub mod relay;
pub mod report;
pub mod runner;
pub mod sensor;
pub mod state;
pub mod util;

pub use builder::MonitorBuilder;
pub use classifier::{ActuatorState, Status, classify};
pub use config::MonitorCfg;
pub use error::{BuildError, MonitorError, SensorFault};
pub use mode_switch::{ButtonPolarity, DebounceStrategy, OperatingMode};
pub use monitor::Monitor;
pub use report::{FnReporter, Reporter, Snapshot, TracingReporter};
pub use runner::{RunOptions, RunSummary, run};
pub use sensor::{LinearMap, Reading, SetpointMap};
