use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("i2c error: {0}")]
    I2c(String),
    #[error("no MPR121 found at i2c address {address:#04x}")]
    NotFound { address: u16 },
    #[error("touch controller timeout")]
    Timeout,
    #[error("invalid simulation script: {0}")]
    Script(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
