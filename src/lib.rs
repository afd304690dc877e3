#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # netresilience
//!
//! Retry engine for flaky network work such as media downloads.
//!
//! ## Features
//!
//! - **Exponential backoff** with a configurable multiplier and ceiling
//! - **Jitter** of ±25% to keep many clients from retrying in lockstep
//! - **Per-attempt timeouts** integrated with tokio
//! - **Error classification** by message: timeouts, connection failures, 5xx and rate limits
//!   are retried; auth errors, missing or unplayable content are not
//! - **Batch fan-out** with results in input order and an optional concurrency bound
//! - **Online probe** for a quick reachability hint (feature `online`)
//!
//! ## Quick Start
//!
//! ```rust
//! use netresilience::{RetryEngine, RetryOverrides};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = RetryEngine::default();
//!     let config = engine
//!         .overridden(&RetryOverrides::new().max_retries(2).base_delay(Duration::from_millis(10)))
//!         .unwrap();
//!
//!     let outcome = engine
//!         .execute_with(&config, "download track", || async {
//!             // Your async operation here
//!             Ok::<_, std::io::Error>(vec![0u8; 16])
//!         })
//!         .await;
//!     assert!(outcome.is_success());
//! }
//! ```

pub mod backoff;
pub mod classify;
pub mod config;
pub mod error;
pub mod jitter;
#[cfg(feature = "online")]
pub mod online;
pub mod outcome;
pub mod prelude;
pub mod presets;
pub mod retry;
pub mod sleeper;
pub mod telemetry;
pub mod timeout;

// Re-exports
pub use backoff::{Backoff, BackoffError};
pub use classify::{classify_message, BoxError, ClassifiedError, ErrorKind};
pub use config::{RetryConfig, RetryConfigBuilder, RetryOverrides};
pub use error::{AttemptTimedOut, ConfigError};
pub use jitter::Jitter;
#[cfg(feature = "online")]
pub use online::{is_online, OnlineProbe};
pub use outcome::{OperationOutcome, Termination};
pub use retry::{RetryEngine, RetryEngineBuilder};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
pub use timeout::TimeoutPolicy;
