//! Terminal result of one retry session.

use crate::classify::{ClassifiedError, ErrorKind};
use std::time::Duration;

/// How a session ended, derived from the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Succeeded,
    /// Every permitted attempt failed with a retryable error.
    Exhausted,
    /// A permanent failure stopped the loop early.
    NonRetryable,
}

/// Result of [`RetryEngine::execute`](crate::RetryEngine::execute).
///
/// Produced once per call and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct OperationOutcome<T> {
    result: Result<T, ClassifiedError>,
    attempts: u32,
    elapsed: Duration,
}

impl<T> OperationOutcome<T> {
    pub(crate) fn new(result: Result<T, ClassifiedError>, attempts: u32, elapsed: Duration) -> Self {
        Self { result, attempts, elapsed }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn value(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    pub fn failure(&self) -> Option<&ClassifiedError> {
        self.result.as_ref().err()
    }

    /// Kind of the final failure, if the session failed.
    pub fn failure_kind(&self) -> Option<ErrorKind> {
        self.failure().map(ClassifiedError::kind)
    }

    /// Attempts actually made, including the successful one.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Wall-clock time from the first attempt to the end of the session.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn termination(&self) -> Termination {
        match &self.result {
            Ok(_) => Termination::Succeeded,
            Err(e) if e.is_retryable() => Termination::Exhausted,
            Err(_) => Termination::NonRetryable,
        }
    }

    pub fn as_result(&self) -> Result<&T, &ClassifiedError> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Result<T, ClassifiedError> {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn failed(message: &str, attempts: u32) -> OperationOutcome<()> {
        let err = ClassifiedError::classify(io::Error::new(io::ErrorKind::Other, message.to_string()));
        OperationOutcome::new(Err(err), attempts, Duration::from_millis(5))
    }

    #[test]
    fn success_accessors() {
        let outcome = OperationOutcome::new(Ok(7), 2, Duration::from_millis(30));
        assert!(outcome.is_success());
        assert_eq!(outcome.value(), Some(&7));
        assert!(outcome.failure().is_none());
        assert_eq!(outcome.termination(), Termination::Succeeded);
        assert_eq!(outcome.attempts(), 2);
        assert_eq!(outcome.into_result().unwrap(), 7);
    }

    #[test]
    fn termination_distinguishes_failures() {
        let exhausted = failed("502 bad gateway", 3);
        assert_eq!(exhausted.termination(), Termination::Exhausted);
        assert_eq!(exhausted.failure_kind(), Some(ErrorKind::ServerError));

        let permanent = failed("video not available", 1);
        assert_eq!(permanent.termination(), Termination::NonRetryable);
        assert!(permanent.value().is_none());
    }
}
