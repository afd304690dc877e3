//! Retry configuration.
//!
//! A [`RetryConfig`] is only obtainable through validation, so the engine never has to
//! re-check it. Per-call tweaks are expressed as [`RetryOverrides`] and merged onto an
//! engine's defaults with [`RetryConfig::merge`]; fields left unset keep the default value.
//!
//! ```rust
//! use netresilience::{RetryConfig, RetryOverrides};
//! use std::time::Duration;
//!
//! let defaults = RetryConfig::default();
//! let quick = defaults
//!     .merge(&RetryOverrides::new().max_retries(1).timeout(Duration::from_secs(5)))
//!     .unwrap();
//! assert_eq!(quick.total_attempts(), 2);
//! assert_eq!(quick.base_delay(), defaults.base_delay());
//! ```

use crate::backoff::Backoff;
use crate::error::ConfigError;
use crate::jitter::Jitter;
use std::time::Duration;

const DEFAULT_MAX_RETRIES: u32 = 5;
const DEFAULT_BASE_DELAY_MILLIS: u64 = 1_000;
const DEFAULT_MAX_DELAY_MILLIS: u64 = 30_000;
const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
const DEFAULT_TIMEOUT_MILLIS: u64 = 30_000;

/// Validated retry policy for one engine call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f64,
    jitter: bool,
    timeout: Duration,
}

impl Default for RetryConfig {
    /// Five retries, 1s doubling to at most 30s, ±25% jitter, 30s per attempt.
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MILLIS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MILLIS),
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            jitter: true,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MILLIS),
        }
    }
}

impl RetryConfig {
    /// Builder seeded with [`RetryConfig::default`].
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder { config: Self::default() }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Initial attempt plus retries.
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff_multiplier
    }

    pub fn jitter_enabled(&self) -> bool {
        self.jitter
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Backoff curve described by this config.
    pub fn backoff(&self) -> Backoff {
        Backoff::from_parts(self.base_delay, self.backoff_multiplier, self.max_delay)
    }

    pub fn jitter(&self) -> Jitter {
        Jitter::from_flag(self.jitter)
    }

    /// Delay to wait after failed attempt number `attempt` (1-based), before jitter.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff().delay(attempt as usize)
    }

    /// Apply `overrides` on top of `self` and validate the result.
    pub fn merge(&self, overrides: &RetryOverrides) -> Result<Self, ConfigError> {
        let merged = Self {
            max_retries: overrides.max_retries.unwrap_or(self.max_retries),
            base_delay: overrides.base_delay.unwrap_or(self.base_delay),
            max_delay: overrides.max_delay.unwrap_or(self.max_delay),
            backoff_multiplier: overrides.backoff_multiplier.unwrap_or(self.backoff_multiplier),
            jitter: overrides.jitter.unwrap_or(self.jitter),
            timeout: overrides.timeout.unwrap_or(self.timeout),
        };
        merged.validate()?;
        Ok(merged)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let m = self.backoff_multiplier;
        if !m.is_finite() || m <= 1.0 {
            return Err(ConfigError::InvalidMultiplier(m));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.max_delay < self.base_delay {
            return Err(ConfigError::MaxLessThanBase { base: self.base_delay, max: self.max_delay });
        }
        Ok(())
    }
}

/// Builder for [`RetryConfig`].
#[derive(Debug, Clone)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    /// Retries after the first attempt; `0` means a single attempt.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.config.base_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.config.max_delay = delay;
        self
    }

    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.config.backoff_multiplier = multiplier;
        self
    }

    pub fn jitter(mut self, enabled: bool) -> Self {
        self.config.jitter = enabled;
        self
    }

    /// Per-attempt timeout. Must be non-zero.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<RetryConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Partial configuration; unset fields inherit from the config it is merged onto.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RetryOverrides {
    max_retries: Option<u32>,
    base_delay: Option<Duration>,
    max_delay: Option<Duration>,
    backoff_multiplier: Option<f64>,
    jitter: Option<bool>,
    timeout: Option<Duration>,
}

impl RetryOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = Some(delay);
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = Some(multiplier);
        self
    }

    pub fn jitter(mut self, enabled: bool) -> Self {
        self.jitter = Some(enabled);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(feature = "serde")]
mod json {
    use super::RetryOverrides;
    use crate::error::ConfigError;
    use serde::Deserialize;
    use std::time::Duration;

    /// Wire shape: camelCase keys, durations in milliseconds.
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase", deny_unknown_fields)]
    struct OverridesWire {
        max_retries: Option<u32>,
        base_delay: Option<u64>,
        max_delay: Option<u64>,
        backoff_multiplier: Option<f64>,
        jitter: Option<bool>,
        timeout: Option<u64>,
    }

    impl From<OverridesWire> for RetryOverrides {
        fn from(wire: OverridesWire) -> Self {
            Self {
                max_retries: wire.max_retries,
                base_delay: wire.base_delay.map(Duration::from_millis),
                max_delay: wire.max_delay.map(Duration::from_millis),
                backoff_multiplier: wire.backoff_multiplier,
                jitter: wire.jitter,
                timeout: wire.timeout.map(Duration::from_millis),
            }
        }
    }

    impl RetryOverrides {
        /// Parse overrides such as `{"maxRetries": 2, "baseDelay": 100}`.
        pub fn from_json(input: &str) -> Result<Self, ConfigError> {
            serde_json::from_str::<OverridesWire>(input)
                .map(Into::into)
                .map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_download_policy() {
        let cfg = RetryConfig::default();
        assert_eq!(cfg.max_retries(), 5);
        assert_eq!(cfg.total_attempts(), 6);
        assert_eq!(cfg.base_delay(), Duration::from_secs(1));
        assert_eq!(cfg.max_delay(), Duration::from_secs(30));
        assert_eq!(cfg.backoff_multiplier(), 2.0);
        assert!(cfg.jitter_enabled());
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn merge_keeps_unset_fields() {
        let base = RetryConfig::default();
        let merged = base.merge(&RetryOverrides::new().max_retries(2).jitter(false)).unwrap();
        assert_eq!(merged.max_retries(), 2);
        assert!(!merged.jitter_enabled());
        assert_eq!(merged.timeout(), base.timeout());
        assert_eq!(merged.max_delay(), base.max_delay());
        assert_eq!(base.merge(&RetryOverrides::new()).unwrap(), base);
    }

    #[test]
    fn merge_rejects_invalid_result() {
        let base = RetryConfig::default();
        assert_eq!(
            base.merge(&RetryOverrides::new().backoff_multiplier(1.0)),
            Err(ConfigError::InvalidMultiplier(1.0))
        );
        assert_eq!(
            base.merge(&RetryOverrides::new().timeout(Duration::ZERO)),
            Err(ConfigError::ZeroTimeout)
        );
        assert!(matches!(
            base.merge(&RetryOverrides::new().base_delay(Duration::from_secs(60))),
            Err(ConfigError::MaxLessThanBase { .. })
        ));
    }

    #[test]
    fn delay_after_follows_curve_and_cap() {
        let cfg = RetryConfig::builder()
            .base_delay(Duration::from_millis(100))
            .max_delay(Duration::from_millis(500))
            .backoff_multiplier(2.0)
            .build()
            .unwrap();
        let delays: Vec<_> = (1..=5).map(|a| cfg.delay_after(a)).collect();
        assert_eq!(
            delays,
            [100, 200, 400, 500, 500].map(Duration::from_millis).to_vec(),
        );
    }

    #[test]
    fn builder_accepts_zero_retries() {
        let cfg = RetryConfig::builder().max_retries(0).build().unwrap();
        assert_eq!(cfg.total_attempts(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn overrides_parse_from_json() {
        let overrides =
            RetryOverrides::from_json(r#"{"maxRetries": 2, "baseDelay": 100, "jitter": false}"#)
                .unwrap();
        let cfg = RetryConfig::default().merge(&overrides).unwrap();
        assert_eq!(cfg.max_retries(), 2);
        assert_eq!(cfg.base_delay(), Duration::from_millis(100));
        assert!(!cfg.jitter_enabled());

        assert!(matches!(
            RetryOverrides::from_json(r#"{"retries": 2}"#),
            Err(ConfigError::Parse(_))
        ));
    }
}
