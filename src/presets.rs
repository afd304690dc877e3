//! Ready-made retry configurations.
//!
//! - [`download`]: large media transfers (the crate default).
//! - [`metadata`]: small API lookups where a user is waiting.
//! - [`single_attempt`]: classification and timeout without retries.
//!
//! ```rust
//! use netresilience::{presets, RetryEngine};
//!
//! let engine = RetryEngine::new(presets::metadata());
//! assert_eq!(engine.defaults().total_attempts(), 3);
//! ```

use crate::config::RetryConfig;
use std::time::Duration;

const METADATA_MAX_RETRIES: u32 = 2;
const METADATA_BASE_DELAY_MILLIS: u64 = 250;
const METADATA_MAX_DELAY_MILLIS: u64 = 2_000;
const METADATA_TIMEOUT_SECS: u64 = 10;

const SINGLE_ATTEMPT_TIMEOUT_SECS: u64 = 30;

/// Five retries, 1s doubling to 30s, jitter, 30s per attempt.
pub fn download() -> RetryConfig {
    RetryConfig::default()
}

/// Two quick retries (250ms, 500ms), 10s per attempt.
pub fn metadata() -> RetryConfig {
    RetryConfig::builder()
        .max_retries(METADATA_MAX_RETRIES)
        .base_delay(Duration::from_millis(METADATA_BASE_DELAY_MILLIS))
        .max_delay(Duration::from_millis(METADATA_MAX_DELAY_MILLIS))
        .timeout(Duration::from_secs(METADATA_TIMEOUT_SECS))
        .build()
        .unwrap_or_default()
}

/// One attempt with a 30s timeout.
pub fn single_attempt() -> RetryConfig {
    RetryConfig::builder()
        .max_retries(0)
        .jitter(false)
        .timeout(Duration::from_secs(SINGLE_ATTEMPT_TIMEOUT_SECS))
        .build()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_is_the_default() {
        assert_eq!(download(), RetryConfig::default());
    }

    #[test]
    fn metadata_is_short() {
        let cfg = metadata();
        assert_eq!(cfg.total_attempts(), 3);
        assert_eq!(cfg.delay_after(1), Duration::from_millis(250));
        assert_eq!(cfg.delay_after(2), Duration::from_millis(500));
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn single_attempt_never_retries() {
        let cfg = single_attempt();
        assert_eq!(cfg.total_attempts(), 1);
        assert!(!cfg.jitter_enabled());
    }
}
