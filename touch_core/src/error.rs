use thiserror::Error;

/// Failures around the decoder: sensor access, configuration, I/O.
///
/// The decoder itself cannot fail once built; these come from the sampling
/// and reporting code that drives it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecoderError {
    #[error("sensor error: {0}")]
    Sensor(String),
    #[error("sensor fault: {0}")]
    SensorFault(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("timeout waiting for sensor")]
    Timeout,
    #[error("io error: {0}")]
    Io(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing channel width")]
    MissingWidth,
    #[error("channel width {0} out of range (1..=32)")]
    InvalidWidth(u8),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
