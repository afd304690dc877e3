//! Per-attempt timeout.
//!
//! Each attempt is raced against a tokio timer. When the timer wins, the attempt future is
//! dropped at its current await point and the attempt fails with [`AttemptTimedOut`]. Work
//! the operation spawned onto other tasks keeps running; its result is never observed.

use crate::classify::BoxError;
use crate::error::{AttemptTimedOut, ConfigError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    duration: Duration,
}

impl TimeoutPolicy {
    /// Create a timeout policy; zero durations are rejected.
    pub fn new(duration: Duration) -> Result<Self, ConfigError> {
        if duration.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Self { duration })
    }

    /// For durations already checked by [`RetryConfig`](crate::RetryConfig).
    pub(crate) fn from_validated(duration: Duration) -> Self {
        Self { duration }
    }

    /// Inspect the configured timeout duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Await `attempt`, failing with [`AttemptTimedOut`] if the timer fires first.
    ///
    /// `context` ends up in the timeout message and should identify the attempt.
    pub async fn execute<T, E, Fut>(&self, context: &str, attempt: Fut) -> Result<T, BoxError>
    where
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        match tokio::time::timeout(self.duration, attempt).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(Arc::new(e)),
            Err(_) => Err(Arc::new(AttemptTimedOut {
                timeout: self.duration,
                context: context.to_string(),
            })),
        }
    }
}
