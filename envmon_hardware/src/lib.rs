//! Hardware backends for the environmental monitor.
//!
//! - `sim`: simulated inputs and outputs, always available.
//! - `w1`: 1-Wire sysfs temperature probe, always available (plain file IO).
//! - `gpio` / `mcp3008`: Raspberry Pi backends behind the `hardware` feature.
pub mod error;
pub mod sim;
pub mod w1;

#[cfg(feature = "hardware")]
pub mod gpio;
#[cfg(feature = "hardware")]
pub mod mcp3008;

pub use error::HwError;
pub use sim::{SimulatedAnalog, SimulatedButton, SimulatedPin, SimulatedProbe, SimulatedPwm};
pub use w1::W1Probe;
