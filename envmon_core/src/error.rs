use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum MonitorError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
}

/// Transient failure of a sensor read. Never propagated out of the control
/// loop: the caller substitutes a fallback value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SensorFault {
    #[error("sensor timeout")]
    Timeout,
    #[error("sensor hardware fault: {0}")]
    Hardware(String),
    #[error("transient sensor fault: {0}")]
    Transient(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing temperature input")]
    MissingTemperature,
    #[error("missing light input")]
    MissingLight,
    #[error("missing setpoint input")]
    MissingSetpoint,
    #[error("missing mode button")]
    MissingButton,
    #[error("missing indicator outputs")]
    MissingIndicators,
    #[error("missing relay output")]
    MissingRelay,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
