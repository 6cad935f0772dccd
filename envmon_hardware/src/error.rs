use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("spi error: {0}")]
    Spi(String),
    #[error("probe timeout")]
    Timeout,
    #[error("probe crc check failed")]
    ProbeCrc,
    #[error("probe output malformed: {0}")]
    ProbeFormat(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
