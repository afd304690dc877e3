//! Error types for configuration and attempt timeouts.
//!
//! Operation failures never surface as `Err` from the engine; they are captured in
//! [`OperationOutcome`](crate::OperationOutcome) as a
//! [`ClassifiedError`](crate::ClassifiedError). The types here cover everything else.
use std::time::Duration;

/// Rejected retry configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The multiplier must be finite and strictly greater than one.
    #[error("backoff multiplier must be finite and greater than 1 (got {0})")]
    InvalidMultiplier(f64),
    /// A zero timeout would fail every attempt before it starts.
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
    #[error("max delay ({max:?}) must be >= base delay ({base:?})")]
    MaxLessThanBase { base: Duration, max: Duration },
    /// `batch_concurrency(0)` would never admit an operation.
    #[error("batch concurrency must be greater than zero")]
    ZeroBatchConcurrency,
    #[error("batch concurrency {limit} exceeds the supported maximum of {max}")]
    BatchConcurrencyTooLarge { limit: usize, max: usize },
    #[cfg(feature = "serde")]
    #[error("invalid retry overrides: {0}")]
    Parse(String),
}

/// The timer won the race against a single attempt.
///
/// The message always contains "timed out", which the classifier maps to
/// [`ErrorKind::Timeout`](crate::ErrorKind::Timeout).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Operation timed out after {}ms: {context}", .timeout.as_millis())]
pub struct AttemptTimedOut {
    pub timeout: Duration,
    pub context: String,
}
