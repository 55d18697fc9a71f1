//! Error types for Disha

use thiserror::Error;

/// Disha error type
#[derive(Error, Debug)]
pub enum DishaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A sensor message carried a non-finite value. The message is dropped
    /// and estimator state is left untouched.
    #[error("Malformed measurement: {field} = {value}")]
    MalformedMeasurement { field: &'static str, value: f64 },

    /// Trust weights that are out of range or do not sum to exactly 1.
    #[error("Invalid trust pair: gps={gps}, imu={imu} (must be in [0, 1] and sum to 1)")]
    InvalidTrust { gps: f64, imu: f64 },

    #[error("Replay error at line {line}: {message}")]
    Replay { line: usize, message: String },
}

impl From<toml::de::Error> for DishaError {
    fn from(e: toml::de::Error) -> Self {
        DishaError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DishaError>;
