//! Error types for the anofox-stream library.

use thiserror::Error;

/// Result type alias for stream operations.
pub type Result<T> = std::result::Result<T, StreamError>;

/// Errors that can occur while building or running a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StreamError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// The simulation clock left the range of representable timestamps.
    #[error("simulation clock out of range: {hours} hours after start")]
    ClockOverflow { hours: f64 },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration file could not be interpreted.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading or writing failed.
    #[error("i/o error: {0}")]
    Io(String),

    /// Report encoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StreamError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        StreamError::InvalidParameter(msg.into())
    }
}

impl From<std::io::Error> for StreamError {
    fn from(err: std::io::Error) -> Self {
        StreamError::Io(err.to_string())
    }
}

impl From<csv::Error> for StreamError {
    fn from(err: csv::Error) -> Self {
        StreamError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        StreamError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for StreamError {
    fn from(err: toml::de::Error) -> Self {
        StreamError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for StreamError {
    fn from(err: toml::ser::Error) -> Self {
        StreamError::Serialization(err.to_string())
    }
}
