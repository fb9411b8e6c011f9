//! Retry policy applied to rate-limited storage calls.
//!
//! Rate-limit signals are retried with exponential back-off plus jitter up to
//! a fixed attempt budget; any other failure is returned to the caller on the
//! first occurrence so it can degrade gracefully.

use std::{future::Future, time::Duration};

use rand::Rng;
use tokio::time::sleep;
use tracing::warn;

use crate::dao::storage::{StorageError, StorageResult};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);
/// Upper bound of the random fraction added to each back-off delay.
const JITTER_FRACTION: f64 = 0.25;

/// Exponential back-off policy with jitter for rate-limited storage calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Build a policy with explicit attempt and delay settings.
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Run `attempt` until it succeeds, fails with a non-retryable error, or
    /// the attempt budget is exhausted.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt: F) -> StorageResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StorageResult<T>>,
    {
        let mut delay = self.base_delay;

        for round in 1..=self.max_attempts {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_rate_limit() && round < self.max_attempts => {
                    warn!(
                        operation,
                        attempt = round,
                        delay_ms = delay.as_millis() as u64,
                        "storage rate limited; backing off"
                    );
                    sleep(with_jitter(delay)).await;
                    delay = (delay * 2).min(self.max_delay);
                }
                Err(err) => {
                    if err.is_rate_limit() {
                        warn!(operation, "storage still rate limited after retries");
                    }
                    return Err(err);
                }
            }
        }

        // Unreachable with max_attempts >= 1; keep the taxonomy honest anyway.
        Err(StorageError::RateLimited {
            message: format!("`{operation}` exhausted its retry budget"),
        })
    }
}

fn with_jitter(delay: Duration) -> Duration {
    let factor = 1.0 + rand::rng().random_range(0.0..JITTER_FRACTION);
    delay.mul_f64(factor)
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use super::*;

    fn rate_limited() -> StorageError {
        StorageError::RateLimited {
            message: "quota exceeded".into(),
        }
    }

    fn tiny_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(1), Duration::from_millis(4))
    }

    #[tokio::test]
    async fn returns_first_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result = tiny_policy(3)
            .run("op", move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(42u32)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_rate_limits_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result = tiny_policy(3)
            .run("op", move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(rate_limited())
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_attempt_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: StorageResult<()> = tiny_policy(3)
            .run("op", move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(rate_limited())
                }
            })
            .await;
        assert!(result.unwrap_err().is_rate_limit());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_rate_limit_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: StorageResult<()> = tiny_policy(3)
            .run("op", move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(StorageError::unavailable(
                        "boom".into(),
                        std::io::Error::other("boom"),
                    ))
                }
            })
            .await;
        assert!(matches!(
            result.unwrap_err(),
            StorageError::Unavailable { .. }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
