//! Retry policy for the HTTP transport

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Status codes retried by the transport
pub const RETRY_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

/// Exponential backoff parameters, all intervals in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackoffStrategy {
    pub initial_interval_ms: u64,
    pub max_interval_ms: u64,
    pub exponent: f64,
    pub max_elapsed_time_ms: u64,
}

impl BackoffStrategy {
    #[must_use]
    pub const fn new(
        initial_interval_ms: u64,
        max_interval_ms: u64,
        exponent: f64,
        max_elapsed_time_ms: u64,
    ) -> Self {
        Self {
            initial_interval_ms,
            max_interval_ms,
            exponent,
            max_elapsed_time_ms,
        }
    }

    /// Delay before retry number `retry` (0-based), capped at the max interval
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn delay(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let millis = self.initial_interval_ms as f64 * self.exponent.powi(exponent);
        let capped = millis.min(self.max_interval_ms as f64).max(0.0);
        Duration::from_millis(capped.round() as u64)
    }

    /// Delay before retry number `retry` given the time spent so far, cut
    /// short so the sleep never outlasts the budget. `None` once the budget
    /// is spent.
    #[must_use]
    pub fn next_delay(&self, retry: u32, elapsed: Duration) -> Option<Duration> {
        let remaining = self.max_elapsed().checked_sub(elapsed)?;
        if remaining.is_zero() {
            return None;
        }
        Some(self.delay(retry).min(remaining))
    }

    /// Total time budget across all attempts
    #[must_use]
    pub const fn max_elapsed(&self) -> Duration {
        Duration::from_millis(self.max_elapsed_time_ms)
    }
}

/// Retry strategy name; only exponential backoff is supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryStrategy {
    Backoff,
}

/// Transport retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    pub strategy: RetryStrategy,
    pub backoff: BackoffStrategy,
    /// Also retry connection and timeout failures
    pub retry_connection_errors: bool,
}

impl RetryConfig {
    /// Policy used by the language model adapter
    #[must_use]
    pub const fn adapter_default() -> Self {
        Self {
            strategy: RetryStrategy::Backoff,
            backoff: BackoffStrategy::new(1, 50, 1.1, 100),
            retry_connection_errors: false,
        }
    }

    /// Whether a response status warrants another attempt
    #[must_use]
    pub fn should_retry_status(&self, status: u16) -> bool {
        RETRY_STATUS_CODES.contains(&status)
    }

    /// Whether a transport failure warrants another attempt
    #[must_use]
    pub fn should_retry_error(&self, error: &reqwest::Error) -> bool {
        self.retry_connection_errors && (error.is_connect() || error.is_timeout())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::adapter_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_policy_constants() {
        let config = RetryConfig::adapter_default();
        assert_eq!(config.strategy, RetryStrategy::Backoff);
        assert_eq!(config.backoff, BackoffStrategy::new(1, 50, 1.1, 100));
        assert!(!config.retry_connection_errors);
        assert_eq!(
            serde_json::to_value(config.strategy).unwrap(),
            serde_json::json!("backoff")
        );
    }

    #[test]
    fn test_delay_grows_and_caps() {
        let backoff = BackoffStrategy::new(10, 50, 2.0, 1000);
        assert_eq!(backoff.delay(0), Duration::from_millis(10));
        assert_eq!(backoff.delay(1), Duration::from_millis(20));
        assert_eq!(backoff.delay(2), Duration::from_millis(40));
        assert_eq!(backoff.delay(3), Duration::from_millis(50));
        assert_eq!(backoff.delay(30), Duration::from_millis(50));
    }

    #[test]
    fn test_delay_is_monotonic_for_adapter_policy() {
        let backoff = RetryConfig::adapter_default().backoff;
        let delays: Vec<_> = (0..60).map(|n| backoff.delay(n)).collect();
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*delays.last().unwrap(), Duration::from_millis(50));
    }

    #[test]
    fn test_next_delay_stays_within_budget() {
        let backoff = RetryConfig::adapter_default().backoff;
        assert_eq!(
            backoff.next_delay(0, Duration::ZERO),
            Some(Duration::from_millis(1))
        );
        // 50 ms backoff with only 20 ms of budget left sleeps 20 ms.
        assert_eq!(
            backoff.next_delay(60, Duration::from_millis(80)),
            Some(Duration::from_millis(20))
        );
        assert_eq!(backoff.next_delay(0, Duration::from_millis(100)), None);
        assert_eq!(backoff.next_delay(0, Duration::from_millis(250)), None);
    }

    #[test]
    fn test_retryable_statuses() {
        let config = RetryConfig::adapter_default();
        for status in [429, 500, 502, 503, 504] {
            assert!(config.should_retry_status(status));
        }
        for status in [400, 401, 404, 422] {
            assert!(!config.should_retry_status(status));
        }
    }
}
