//! Retry policy for chat-completion calls.
//!
//! Off by default: a failed stage falls back immediately. When enabled, only transient
//! failures are retried, judged by HTTP status or transport error kind rather than by
//! message text.

use reqwest::StatusCode;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    /// Wait before the first retry; doubles for each one after.
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_delays(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = max_delay;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.max_retries > 0
    }

    /// Wait before retry number `retry` (zero-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Rate limits, request timeouts, and upstream 5xx.
pub fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

pub(crate) fn is_transient_transport(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}
