//! Retry engine.
//!
//! Runs a fallible async operation under a [`RetryConfig`]:
//! - `max_retries` counts retries after the first attempt; total attempts = `max_retries + 1`.
//! - Every attempt is raced against `timeout`; a timer win counts as a `Timeout` failure.
//! - Failures are classified by message. Permanent failures stop immediately; everything else
//!   is retried until the budget runs out.
//! - Between attempts the engine sleeps `min(max_delay, base_delay * multiplier^(n-1))`,
//!   perturbed by ±25% when jitter is enabled.
//!
//! Invariants:
//! - Attempts never exceed `max_retries + 1`.
//! - The engine never returns an error or panics because an operation failed; the outcome
//!   carries the last classified failure.
//! - Batch results come back in input order.
//!
//! Example
//! ```rust
//! use netresilience::{ErrorKind, RetryConfig, RetryEngine};
//! use std::time::Duration;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let engine = RetryEngine::new(
//!     RetryConfig::builder()
//!         .max_retries(3)
//!         .base_delay(Duration::from_millis(1))
//!         .max_delay(Duration::from_millis(10))
//!         .build()
//!         .unwrap(),
//! );
//! let outcome = engine
//!     .execute("fetch lyrics", || async {
//!         Err::<(), _>(std::io::Error::new(std::io::ErrorKind::Other, "403 Forbidden"))
//!     })
//!     .await;
//! assert_eq!(outcome.attempts(), 1);
//! assert_eq!(outcome.failure_kind(), Some(ErrorKind::PermanentFailure));
//! # });
//! ```

use crate::classify::ClassifiedError;
use crate::config::{RetryConfig, RetryOverrides};
use crate::error::ConfigError;
use crate::outcome::OperationOutcome;
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::telemetry::{emit_best_effort, NullSink, RetryEvent, TelemetrySink};
use crate::timeout::TimeoutPolicy;
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Instant;

/// Executes operations under a retry policy.
///
/// Each engine carries its own defaults; there is no process-wide policy.
#[derive(Clone)]
pub struct RetryEngine<S = NullSink> {
    defaults: RetryConfig,
    sleeper: Arc<dyn Sleeper>,
    telemetry: S,
    batch_concurrency: Option<usize>,
}

impl<S> std::fmt::Debug for RetryEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryEngine")
            .field("defaults", &self.defaults)
            .field("sleeper", &self.sleeper)
            .field("telemetry", &"<sink>")
            .field("batch_concurrency", &self.batch_concurrency)
            .finish()
    }
}

impl RetryEngine<NullSink> {
    /// Engine with the given defaults, real sleeps, no telemetry sink and unbounded batches.
    pub fn new(defaults: RetryConfig) -> Self {
        Self {
            defaults,
            sleeper: Arc::new(TokioSleeper),
            telemetry: NullSink,
            batch_concurrency: None,
        }
    }

    pub fn builder() -> RetryEngineBuilder<NullSink> {
        RetryEngineBuilder::new()
    }
}

impl Default for RetryEngine<NullSink> {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl<S: TelemetrySink> RetryEngine<S> {
    pub fn defaults(&self) -> &RetryConfig {
        &self.defaults
    }

    /// The engine defaults with `overrides` applied.
    pub fn overridden(&self, overrides: &RetryOverrides) -> Result<RetryConfig, ConfigError> {
        self.defaults.merge(overrides)
    }

    /// Run `operation` under the engine defaults.
    pub async fn execute<T, E, Fut, Op>(&self, label: &str, operation: Op) -> OperationOutcome<T>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.execute_with(&self.defaults, label, operation).await
    }

    /// Run `operation` under an explicit config.
    pub async fn execute_with<T, E, Fut, Op>(
        &self,
        config: &RetryConfig,
        label: &str,
        mut operation: Op,
    ) -> OperationOutcome<T>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let start = Instant::now();
        let total = config.total_attempts();
        let timeout = TimeoutPolicy::from_validated(config.timeout());
        let backoff = config.backoff();
        let jitter = config.jitter();

        let mut attempt: u32 = 1;
        loop {
            let context = format!("{label} (attempt {attempt}/{total})");
            let cause = match timeout.execute(&context, operation()).await {
                Ok(value) => {
                    let elapsed = start.elapsed();
                    tracing::debug!(label, attempt, total, "{label} succeeded");
                    self.emit(RetryEvent::Succeeded {
                        label: label.to_string(),
                        attempts: attempt,
                        elapsed,
                    })
                    .await;
                    return OperationOutcome::new(Ok(value), attempt, elapsed);
                }
                Err(cause) => cause,
            };

            let error = ClassifiedError::from_cause(cause);
            let kind = error.kind();
            tracing::warn!(
                label,
                attempt,
                total,
                kind = %kind,
                "{label} failed (attempt {attempt}/{total}): {} [{kind}]",
                error.message()
            );
            self.emit(RetryEvent::AttemptFailed {
                label: label.to_string(),
                attempt,
                total,
                kind,
                message: error.message().to_string(),
            })
            .await;

            if !error.is_retryable() || attempt >= total {
                let elapsed = start.elapsed();
                let event = if error.is_retryable() {
                    RetryEvent::Exhausted {
                        label: label.to_string(),
                        attempts: attempt,
                        kind,
                        elapsed,
                    }
                } else {
                    RetryEvent::NonRetryable {
                        label: label.to_string(),
                        attempts: attempt,
                        kind,
                        elapsed,
                    }
                };
                self.emit(event).await;
                return OperationOutcome::new(Err(error), attempt, elapsed);
            }

            let delay = jitter.apply(backoff.delay(attempt as usize));
            let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
            tracing::info!(
                label,
                attempt,
                total,
                kind = %kind,
                delay_ms,
                "{label} retrying in {delay_ms}ms..."
            );
            self.emit(RetryEvent::RetryScheduled { label: label.to_string(), attempt, delay })
                .await;
            self.sleeper.sleep(delay).await;
            attempt += 1;
        }
    }

    /// Run every operation concurrently under the engine defaults.
    pub async fn execute_batch<T, E, Fut, Op, I>(
        &self,
        label: &str,
        operations: I,
    ) -> Vec<OperationOutcome<T>>
    where
        I: IntoIterator<Item = Op>,
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.execute_batch_with(&self.defaults, label, operations).await
    }

    /// Run every operation concurrently, each in its own retry session labelled
    /// `"{label} [i/n]"`. Outcomes are returned in input order.
    pub async fn execute_batch_with<T, E, Fut, Op, I>(
        &self,
        config: &RetryConfig,
        label: &str,
        operations: I,
    ) -> Vec<OperationOutcome<T>>
    where
        I: IntoIterator<Item = Op>,
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let operations: Vec<Op> = operations.into_iter().collect();
        let count = operations.len();
        let semaphore = self.batch_concurrency.map(Semaphore::new);
        let limit = semaphore.as_ref();

        let sessions = operations.into_iter().enumerate().map(move |(index, operation)| {
            let session_label = format!("{label} [{}/{count}]", index + 1);
            async move {
                // Permit is held for the whole session, retries and sleeps included.
                let _permit = match limit {
                    Some(semaphore) => semaphore.acquire().await.ok(),
                    None => None,
                };
                self.execute_with(config, &session_label, operation).await
            }
        });

        join_all(sessions).await
    }

    async fn emit(&self, event: RetryEvent) {
        emit_best_effort(&self.telemetry, event).await;
    }
}

/// Builder for [`RetryEngine`].
pub struct RetryEngineBuilder<S> {
    defaults: RetryConfig,
    sleeper: Arc<dyn Sleeper>,
    telemetry: S,
    batch_concurrency: Option<usize>,
}

impl RetryEngineBuilder<NullSink> {
    pub fn new() -> Self {
        Self {
            defaults: RetryConfig::default(),
            sleeper: Arc::new(TokioSleeper),
            telemetry: NullSink,
            batch_concurrency: None,
        }
    }
}

impl Default for RetryEngineBuilder<NullSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TelemetrySink> RetryEngineBuilder<S> {
    /// Config used by `execute` and `execute_batch`.
    pub fn defaults(mut self, defaults: RetryConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Provide a custom sleeper implementation.
    pub fn sleeper<Z>(mut self, sleeper: Z) -> Self
    where
        Z: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Send retry events to `sink`.
    pub fn telemetry<T: TelemetrySink>(self, sink: T) -> RetryEngineBuilder<T> {
        RetryEngineBuilder {
            defaults: self.defaults,
            sleeper: self.sleeper,
            telemetry: sink,
            batch_concurrency: self.batch_concurrency,
        }
    }

    /// Bound how many sessions of one batch run at the same time.
    /// Must be in `1..=Semaphore::MAX_PERMITS`.
    pub fn batch_concurrency(mut self, limit: usize) -> Self {
        self.batch_concurrency = Some(limit);
        self
    }

    pub fn build(self) -> Result<RetryEngine<S>, ConfigError> {
        match self.batch_concurrency {
            Some(0) => return Err(ConfigError::ZeroBatchConcurrency),
            Some(limit) if limit > Semaphore::MAX_PERMITS => {
                return Err(ConfigError::BatchConcurrencyTooLarge {
                    limit,
                    max: Semaphore::MAX_PERMITS,
                });
            }
            _ => {}
        }
        Ok(RetryEngine {
            defaults: self.defaults,
            sleeper: self.sleeper,
            telemetry: self.telemetry,
            batch_concurrency: self.batch_concurrency,
        })
    }
}
