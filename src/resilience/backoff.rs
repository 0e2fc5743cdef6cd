//! Exponential backoff policy for connection attempts and job retries.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exponential backoff with a base delay, multiplier and cap.
///
/// Attempt numbers are 1-based: the delay after the first failed attempt is
/// `base_delay_ms`, and each subsequent attempt multiplies the previous delay
/// by `multiplier`, capped at `max_delay_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackoffPolicy {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: 100,
            max_delay_ms: 5_000,
            multiplier: 2.0,
        }
    }
}

impl BackoffPolicy {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let delay_ms = self.base_delay_ms as f64 * self.multiplier.powi(exponent as i32);
        let capped_ms = delay_ms.min(self.max_delay_ms as f64);
        Duration::from_millis(capped_ms as u64)
    }
}
