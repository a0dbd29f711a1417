//! Retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backoff configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds.
    pub initial_delay_ms: u64,
    /// Upper bound for any single delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Factor applied to the delay after each retry.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Policy with the given attempt count and initial delay, other fields
    /// at their defaults.
    #[must_use]
    pub fn new(max_attempts: u32, initial_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            initial_delay_ms,
            ..Self::default()
        }
    }

    /// Sets the delay cap.
    #[must_use]
    pub fn with_max_delay(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    /// Sets the multiplier.
    #[must_use]
    pub fn with_multiplier(mut self, backoff_multiplier: f64) -> Self {
        self.backoff_multiplier = backoff_multiplier;
        self
    }

    /// Delays observed between attempts when every attempt fails.
    #[must_use]
    pub fn delays(&self) -> Vec<Duration> {
        let mut current = self.initial_delay_ms as f64;
        (1..self.max_attempts)
            .map(|_| {
                let delay = self.capped(current);
                current *= self.backoff_multiplier;
                delay
            })
            .collect()
    }

    fn capped(&self, current: f64) -> Duration {
        Duration::from_millis(current.min(self.max_delay_ms as f64) as u64)
    }
}

/// Runs `operation` until it succeeds, attempts run out, or `should_retry`
/// refuses the error.
///
/// `should_retry` receives the error and the 1-based attempt number that
/// produced it. `on_retry` is called with the same pair plus the delay
/// before the next attempt is made.
pub async fn with_retry<T, E, F, Fut, P, R>(
    policy: &RetryPolicy,
    mut operation: F,
    should_retry: P,
    mut on_retry: R,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E, u32) -> bool,
    R: FnMut(&E, u32, Duration),
{
    let mut attempt = 0;
    let mut current = policy.initial_delay_ms as f64;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.max_attempts || !should_retry(&err, attempt) {
                    return Err(err);
                }
                let delay = policy.capped(current);
                on_retry(&err, attempt, delay);
                tokio::time::sleep(delay).await;
                current *= policy.backoff_multiplier;
            }
        }
    }
}
