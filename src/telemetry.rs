//! Structured retry events.
//!
//! Besides its log lines, the engine reports every state transition of a retry session as a
//! [`RetryEvent`] to a telemetry sink. Sinks are `tower::Service<RetryEvent>` implementations,
//! so they compose with the usual tower combinators.
//!
//! ```rust
//! use netresilience::telemetry::{MemorySink, RetryEvent};
//! use netresilience::{RetryConfig, RetryEngine};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let sink = MemorySink::new();
//! let engine = RetryEngine::builder()
//!     .defaults(RetryConfig::builder().max_retries(0).build().unwrap())
//!     .telemetry(sink.clone())
//!     .build()
//!     .unwrap();
//!
//! engine.execute("ping", || async { Ok::<_, std::io::Error>(()) }).await;
//! assert!(matches!(sink.events()[0], RetryEvent::Succeeded { attempts: 1, .. }));
//! # }
//! ```

use crate::classify::ErrorKind;
use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

/// Events emitted by the retry engine, one per state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryEvent {
    /// An attempt failed (error or timeout) and was classified.
    AttemptFailed { label: String, attempt: u32, total: u32, kind: ErrorKind, message: String },
    /// Another attempt will run after `delay`.
    RetryScheduled { label: String, attempt: u32, delay: Duration },
    Succeeded { label: String, attempts: u32, elapsed: Duration },
    /// The retry budget ran out on a retryable failure.
    Exhausted { label: String, attempts: u32, kind: ErrorKind, elapsed: Duration },
    /// A permanent failure ended the session early.
    NonRetryable { label: String, attempts: u32, kind: ErrorKind, elapsed: Duration },
}

impl RetryEvent {
    pub fn label(&self) -> &str {
        match self {
            RetryEvent::AttemptFailed { label, .. }
            | RetryEvent::RetryScheduled { label, .. }
            | RetryEvent::Succeeded { label, .. }
            | RetryEvent::Exhausted { label, .. }
            | RetryEvent::NonRetryable { label, .. } => label,
        }
    }
}

impl fmt::Display for RetryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryEvent::AttemptFailed { label, attempt, total, kind, .. } => {
                write!(f, "AttemptFailed({label}, {attempt}/{total}, {kind})")
            }
            RetryEvent::RetryScheduled { label, attempt, delay } => {
                write!(f, "RetryScheduled({label}, after #{attempt}, delay={delay:?})")
            }
            RetryEvent::Succeeded { label, attempts, elapsed } => {
                write!(f, "Succeeded({label}, attempts={attempts}, elapsed={elapsed:?})")
            }
            RetryEvent::Exhausted { label, attempts, kind, .. } => {
                write!(f, "Exhausted({label}, attempts={attempts}, {kind})")
            }
            RetryEvent::NonRetryable { label, attempts, kind, .. } => {
                write!(f, "NonRetryable({label}, attempts={attempts}, {kind})")
            }
        }
    }
}

type SinkFuture = BoxFuture<'static, Result<(), Infallible>>;

/// A telemetry sink that consumes retry events.
///
/// Implemented automatically for every cloneable, infallible `Service<RetryEvent>` with a
/// boxed future.
pub trait TelemetrySink:
    Service<RetryEvent, Response = (), Error = Infallible, Future = SinkFuture>
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<S> TelemetrySink for S where
    S: Service<RetryEvent, Response = (), Error = Infallible, Future = SinkFuture>
        + Clone
        + Send
        + Sync
        + 'static
{
}

/// Best-effort emit helper that honors `poll_ready`.
///
/// Telemetry never fails a retry session: an unready sink simply drops the event.
pub async fn emit_best_effort<S: TelemetrySink>(sink: &S, event: RetryEvent) {
    use tower::ServiceExt;

    let mut ready_sink = match sink.clone().ready_oneshot().await {
        Ok(ready_sink) => ready_sink,
        Err(never) => match never {},
    };
    let _ = ready_sink.call(event).await;
}

/// A no-op telemetry sink that discards all events.
#[derive(Clone, Debug, Default)]
pub struct NullSink;

impl Service<RetryEvent> for NullSink {
    type Response = ();
    type Error = Infallible;
    type Future = SinkFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _event: RetryEvent) -> Self::Future {
        Box::pin(async { Ok(()) })
    }
}

/// A telemetry sink that logs events using `tracing` at DEBUG level.
#[derive(Clone, Debug, Default)]
pub struct LogSink;

impl Service<RetryEvent> for LogSink {
    type Response = ();
    type Error = Infallible;
    type Future = SinkFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: RetryEvent) -> Self::Future {
        tracing::debug!(event = %event, "retry_event");
        Box::pin(async { Ok(()) })
    }
}

/// A telemetry sink that stores events in memory.
///
/// Bounded; the oldest events are evicted once `capacity` is reached.
#[derive(Clone, Debug)]
pub struct MemorySink {
    events: Arc<Mutex<VecDeque<RetryEvent>>>,
    capacity: usize,
    evicted: Arc<AtomicU64>,
}

impl MemorySink {
    /// Creates a bounded memory sink (default cap: 10,000).
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::new())),
            capacity: capacity.max(1),
            evicted: Arc::new(AtomicU64::new(0)),
        }
    }

    fn guard(&self) -> MutexGuard<'_, VecDeque<RetryEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns a snapshot of all events received so far.
    pub fn events(&self) -> Vec<RetryEvent> {
        self.guard().iter().cloned().collect()
    }

    /// Events whose label matches exactly.
    pub fn events_for(&self, label: &str) -> Vec<RetryEvent> {
        self.guard().iter().filter(|e| e.label() == label).cloned().collect()
    }

    pub fn clear(&self) {
        self.guard().clear();
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<RetryEvent> for MemorySink {
    type Response = ();
    type Error = Infallible;
    type Future = SinkFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: RetryEvent) -> Self::Future {
        let mut guard = self.guard();
        if guard.len() >= self.capacity {
            guard.pop_front();
            self.evicted.fetch_add(1, Ordering::Relaxed);
        }
        guard.push_back(event);
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduled(attempt: u32) -> RetryEvent {
        RetryEvent::RetryScheduled {
            label: "song.mp3".into(),
            attempt,
            delay: Duration::from_millis(100),
        }
    }

    #[tokio::test]
    async fn memory_sink_records_and_evicts() {
        let sink = MemorySink::with_capacity(2);
        for attempt in 1..=3 {
            emit_best_effort(&sink, scheduled(attempt)).await;
        }
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.evicted(), 1);
        assert_eq!(sink.events(), vec![scheduled(2), scheduled(3)]);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn null_and_log_sinks_accept_events() {
        emit_best_effort(&NullSink, scheduled(1)).await;
        emit_best_effort(&LogSink, scheduled(1)).await;
    }

    #[test]
    fn display_includes_label_and_kind() {
        let event = RetryEvent::AttemptFailed {
            label: "cover art".into(),
            attempt: 2,
            total: 4,
            kind: ErrorKind::RateLimited,
            message: "Rate limited: 429".into(),
        };
        assert_eq!(event.to_string(), "AttemptFailed(cover art, 2/4, rate_limited)");
        assert_eq!(event.label(), "cover art");
    }
}
