//! Convenient re-exports for common netresilience types.
pub use crate::{
    backoff::{Backoff, BackoffError, MAX_BACKOFF},
    classify::{ClassifiedError, ErrorKind},
    config::{RetryConfig, RetryOverrides},
    error::ConfigError,
    jitter::Jitter,
    outcome::{OperationOutcome, Termination},
    retry::{RetryEngine, RetryEngineBuilder},
    telemetry::{LogSink, MemorySink, RetryEvent},
};
