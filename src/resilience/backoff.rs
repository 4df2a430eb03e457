//! Backoff between failed resolution attempts.

use std::time::Duration;
use rand::Rng;

use crate::config::BackoffConfig;

/// Calculate exponential backoff delay, optionally with jitter.
///
/// `attempt` is 1-based; attempt 0 yields no delay. With `base_ms == max_ms`
/// every attempt waits exactly `base_ms` (plus jitter when enabled).
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64, jitter: bool) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    // Apply jitter (0 to 10% of the delay)
    let jitter_range = capped_delay / 10;
    let jitter_ms = if jitter && jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter_ms)
}

/// Tracks consecutive resolution failures and yields the next delay.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    config: BackoffConfig,
    attempt: u32,
}

impl ReconnectBackoff {
    pub fn new(config: BackoffConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Register a failed attempt and return how long to wait before the next.
    pub fn next_delay(&mut self) -> Duration {
        self.attempt = self.attempt.saturating_add(1);
        calculate_backoff(
            self.attempt,
            self.config.base_ms,
            self.config.max_ms,
            self.config.jitter,
        )
    }

    /// Forget past failures after a successful resolution.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let b1 = calculate_backoff(1, 100, 2000, true);
        assert!(b1.as_millis() >= 100);

        let b2 = calculate_backoff(2, 100, 2000, true);
        assert!(b2.as_millis() >= 200);

        let max = calculate_backoff(10, 100, 1000, false);
        assert_eq!(max.as_millis(), 1000);
    }

    #[test]
    fn test_default_backoff_is_fixed() {
        let mut backoff = ReconnectBackoff::new(BackoffConfig::default());
        for _ in 0..5 {
            assert_eq!(backoff.next_delay(), Duration::from_secs(5));
        }

        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_backoff_grows_until_cap() {
        let mut backoff = ReconnectBackoff::new(BackoffConfig {
            base_ms: 1000,
            max_ms: 4000,
            jitter: false,
        });
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
        assert_eq!(backoff.next_delay(), Duration::from_secs(4));
        assert_eq!(backoff.next_delay(), Duration::from_secs(4));
    }
}
