//! Retry backoff and polite pacing
//!
//! One policy object per ceiling, shared by the walker, the metadata fetcher
//! and the comment fetcher.

use crate::config::{PacingConfig, RetryConfig};
use rand::Rng;
use std::time::Duration;

/// Linear backoff bounded by a number of attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total fetch attempts, including the first
    pub max_attempts: u32,
    /// Wait unit; the n-th consecutive failure waits `n * base_delay`
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Policy for listing pages and comment pages
    pub fn listing(config: &RetryConfig) -> Self {
        Self::new(
            config.listing_max_attempts,
            Duration::from_millis(config.backoff_base_ms),
        )
    }

    /// Policy for a single submission page
    pub fn item(config: &RetryConfig) -> Self {
        Self::new(
            config.item_max_attempts,
            Duration::from_millis(config.backoff_base_ms),
        )
    }

    /// Returns true if another attempt is allowed after `failures` failures
    pub fn allows_retry(&self, failures: u32) -> bool {
        failures < self.max_attempts
    }

    /// Wait before the attempt that follows `failures` consecutive failures
    pub fn delay_for(&self, failures: u32) -> Duration {
        self.base_delay.saturating_mul(failures)
    }
}

/// Random delay between requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    min: Duration,
    max: Duration,
    recovered_min: Duration,
    recovered_max: Duration,
}

impl Pacing {
    pub fn new(min: Duration, max: Duration, recovered_min: Duration, recovered_max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
            recovered_min,
            recovered_max: recovered_max.max(recovered_min),
        }
    }

    pub fn from_config(config: &PacingConfig) -> Self {
        Self::new(
            Duration::from_millis(config.min_delay_ms),
            Duration::from_millis(config.max_delay_ms),
            Duration::from_millis(config.recovered_min_delay_ms),
            Duration::from_millis(config.recovered_max_delay_ms),
        )
    }

    /// Samples a delay; `recovered` selects the wider range used after a failure
    pub fn delay(&self, recovered: bool) -> Duration {
        let (min, max) = if recovered {
            (self.recovered_min, self.recovered_max)
        } else {
            (self.min, self.max)
        };
        let millis = rand::rng().random_range(min.as_millis() as u64..=max.as_millis() as u64);
        Duration::from_millis(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ceilings() {
        let config = RetryConfig::default();
        assert_eq!(RetryPolicy::listing(&config).max_attempts, 6);
        assert_eq!(RetryPolicy::item(&config).max_attempts, 3);
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::listing(&RetryConfig::default());
        assert_eq!(policy.delay_for(1), Duration::from_secs(30));
        assert_eq!(policy.delay_for(2), Duration::from_secs(60));
        assert_eq!(policy.delay_for(5), Duration::from_secs(150));
    }

    #[test]
    fn test_allows_retry_below_ceiling() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        assert!(policy.allows_retry(1));
        assert!(policy.allows_retry(2));
        assert!(!policy.allows_retry(3));
    }

    #[test]
    fn test_huge_backoff_saturates() {
        let policy = RetryPolicy::new(6, Duration::from_millis(u64::MAX));
        assert_eq!(policy.delay_for(5), Duration::MAX);
    }

    #[test]
    fn test_pacing_stays_in_range() {
        let pacing = Pacing::from_config(&PacingConfig::default());
        for _ in 0..200 {
            let normal = pacing.delay(false);
            assert!(normal >= Duration::from_millis(1000) && normal <= Duration::from_millis(2500));

            let widened = pacing.delay(true);
            assert!(widened >= Duration::from_millis(2000) && widened <= Duration::from_millis(3500));
        }
    }

    #[test]
    fn test_zero_width_range() {
        let pacing = Pacing::new(
            Duration::ZERO,
            Duration::ZERO,
            Duration::from_millis(5),
            Duration::from_millis(5),
        );
        assert_eq!(pacing.delay(false), Duration::ZERO);
        assert_eq!(pacing.delay(true), Duration::from_millis(5));
    }
}
