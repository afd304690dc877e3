//! Jitter strategies to spread retries from many callers.
//!
//! - `None`: deterministic retries for tests or tightly controlled workflows.
//! - `Proportional`: uniform offset in `[-ratio * delay, +ratio * delay]`, floored at zero and
//!   truncated to whole milliseconds. The engine uses a ratio of 0.25 (±25%).
//!
//! RNG: uses `rand`'s thread-local RNG by default; deterministic RNGs can be injected via
//! `apply_with_rng`.
//!
//! ```rust
//! use netresilience::Jitter;
//! use std::time::Duration;
//!
//! let jittered = Jitter::quarter().apply(Duration::from_millis(1000));
//! assert!(jittered >= Duration::from_millis(750));
//! assert!(jittered <= Duration::from_millis(1250));
//! ```

use rand::{rng, Rng};
use std::time::Duration;

/// Ratio used by [`Jitter::quarter`].
pub const DEFAULT_JITTER_RATIO: f64 = 0.25;

/// Jitter strategy for randomizing retry delays
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Jitter {
    /// No jitter - use exact backoff delay
    None,
    /// Symmetric proportional jitter; the ratio is clamped to `[0, 1]`.
    Proportional(f64),
}

impl Jitter {
    /// ±25% of the computed delay.
    pub fn quarter() -> Self {
        Jitter::Proportional(DEFAULT_JITTER_RATIO)
    }

    /// Map the config flag onto a strategy.
    pub fn from_flag(enabled: bool) -> Self {
        if enabled {
            Self::quarter()
        } else {
            Jitter::None
        }
    }

    /// Apply jitter to a delay duration
    pub fn apply(&self, delay: Duration) -> Duration {
        let mut rng = rng();
        self.apply_with_rng(delay, &mut rng)
    }

    /// Apply jitter with a custom RNG (for testing)
    pub fn apply_with_rng<R: Rng>(&self, delay: Duration, rng: &mut R) -> Duration {
        match *self {
            Jitter::None => delay,
            Jitter::Proportional(ratio) => {
                let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
                let millis = delay.as_secs_f64() * 1000.0;
                if millis == 0.0 || ratio == 0.0 {
                    return delay;
                }
                let offset = rng.random_range(-ratio..=ratio) * millis;
                let jittered = (millis + offset).max(0.0).floor();
                Duration::from_millis(jittered.min(u64::MAX as f64) as u64)
            }
        }
    }
}
