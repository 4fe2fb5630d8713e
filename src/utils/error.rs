use std::time::Duration;
use thiserror::Error;

/// Custom error types for the threat detection service.
/// Configuration errors stay `config::ConfigError`; startup wraps them
/// with anyhow instead of routing them through this enum.
#[derive(Error, Debug)]
pub enum ThreatError {
    /// Counter store cannot be reached
    #[error("Counter store unavailable: {0}")]
    StoreUnavailable(String),

    /// Counter store operation exceeded its deadline
    #[error("Counter store operation timed out after {0:?}")]
    StoreTimeout(Duration),

    /// Malformed client identity; rejects the single request, never the process
    #[error("Invalid client identity: {0}")]
    InvalidIdentity(String),

    /// Internal service errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Result type for threat detection service operations
pub type ThreatResult<T> = Result<T, ThreatError>;

impl From<redis::RedisError> for ThreatError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_timeout() {
            ThreatError::StoreTimeout(Duration::ZERO)
        } else {
            ThreatError::StoreUnavailable(err.to_string())
        }
    }
}
