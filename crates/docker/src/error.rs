//! Engine error types
//!
//! [`EngineError`] covers every failure of an engine call or of handling its result.
//! `From<EngineError> for HoistError` is implemented, so callers can propagate
//! it upward with `?`.
//!
//! Decoding anomalies and cleanup failures are not errors.
//! Both are logged and never reach the caller.

use hoist_core::error::{ConfigError, HoistError};

/// Container engine domain error
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Engine API call failed, including 4xx/5xx responses
    #[error("docker api error: {0}")]
    Api(String),

    /// Could not connect to the engine socket
    #[error("docker connection error: {0}")]
    Connection(String),

    /// Entity not found (the engine answered 404)
    #[error("not found: {0}")]
    NotFound(String),

    /// Engine-shaped parameters could not be interpreted
    #[error("invalid parameters for {operation}: {reason}")]
    InvalidParams {
        /// Engine operation being called
        operation: String,
        /// Why it failed
        reason: String,
    },

    /// Transport error while reading an output stream
    #[error("output stream error: {0}")]
    Stream(String),

    /// Configuration error
    #[error("config error: {field}: {reason}")]
    Config {
        /// Config field name
        field: String,
        /// Reason
        reason: String,
    },
}

impl From<EngineError> for HoistError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Config { field, reason } => {
                HoistError::Config(ConfigError::InvalidValue { field, reason })
            }
            other => HoistError::Engine(other.to_string()),
        }
    }
}
