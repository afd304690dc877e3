//! Exponential backoff for the retry engine.
//!
//! Attempt semantics: attempt index `0` represents the initial call (no delay), and retries
//! start at `attempt = 1`, which yields the base delay. Each further retry multiplies the
//! previous delay by the configured multiplier until the ceiling is reached.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use netresilience::Backoff;
//!
//! let backoff = Backoff::exponential(Duration::from_millis(100), 2.0)
//!     .unwrap()
//!     .with_max(Duration::from_secs(2))
//!     .unwrap();
//! assert_eq!(backoff.delay(0), Duration::ZERO); // initial call
//! assert_eq!(backoff.delay(1), Duration::from_millis(100));
//! assert_eq!(backoff.delay(2), Duration::from_millis(200));
//! assert_eq!(backoff.delay(6), Duration::from_secs(2)); // capped
//! ```
//!
//! Overflow behavior: an explicit max is always honored. Uncapped backoff saturates to
//! `MAX_BACKOFF` (1 day) instead of overflowing.

use std::time::Duration;

/// Ceiling for backoff without an explicit max (1 day).
pub const MAX_BACKOFF: Duration = Duration::from_secs(24 * 60 * 60);

/// Errors returned by backoff configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackoffError {
    #[error("backoff multiplier must be finite and greater than 1 (got {0})")]
    InvalidMultiplier(f64),
    #[error("max must be greater than zero")]
    MaxMustBePositive,
    #[error("max ({max:?}) must be >= base ({base:?})")]
    MaxLessThanBase { base: Duration, max: Duration },
}

/// Exponential backoff: `base * multiplier^(attempt - 1)`, optionally capped.
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    base: Duration,
    multiplier: f64,
    max: Option<Duration>,
}

impl Backoff {
    /// Create an exponential backoff. The multiplier must be finite and `> 1`.
    pub fn exponential(base: Duration, multiplier: f64) -> Result<Self, BackoffError> {
        if !multiplier.is_finite() || multiplier <= 1.0 {
            return Err(BackoffError::InvalidMultiplier(multiplier));
        }
        Ok(Self { base, multiplier, max: None })
    }

    /// Skips validation; callers must already have checked the multiplier.
    pub(crate) fn from_parts(base: Duration, multiplier: f64, max: Duration) -> Self {
        Self { base, multiplier, max: Some(max) }
    }

    /// Set a ceiling for the computed delay.
    pub fn with_max(mut self, max: Duration) -> Result<Self, BackoffError> {
        if max.is_zero() {
            return Err(BackoffError::MaxMustBePositive);
        }
        if max < self.base {
            return Err(BackoffError::MaxLessThanBase { base: self.base, max });
        }
        self.max = Some(max);
        Ok(self)
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn max(&self) -> Option<Duration> {
        self.max
    }

    /// Delay before retry number `attempt` (0 = initial call, no delay).
    pub fn delay(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exponent = attempt.saturating_sub(1).min(i32::MAX as usize) as i32;
        // Nanosecond arithmetic keeps whole-millisecond bases exact for integral multipliers.
        let nanos = self.base.as_nanos() as f64 * self.multiplier.powi(exponent);
        let ceiling = self.max.unwrap_or(MAX_BACKOFF);
        if !nanos.is_finite() || nanos >= ceiling.as_nanos() as f64 {
            return ceiling;
        }
        let nanos = nanos.round();
        if nanos < u64::MAX as f64 {
            Duration::from_nanos(nanos as u64)
        } else {
            Duration::try_from_secs_f64(nanos / 1e9).unwrap_or(ceiling)
        }
    }
}
