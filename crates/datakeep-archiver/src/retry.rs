//! Retry schedule for store operations
//!
//! Remote tiers fail transiently; the archive job retries those failures
//! with exponential backoff instead of surfacing them immediately.

use datakeep_domain::StoreError;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Exponential backoff applied to retryable store errors
///
/// Only errors classified retryable by [`StoreError::is_retryable`] get
/// another attempt; permanent failures (missing keys, invalid
/// configuration) surface immediately.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts per operation, including the first
    pub max_attempts: u32,

    /// Backoff after the first failed attempt, doubled per retry
    pub base_delay: Duration,

    /// Upper bound on backoff between attempts
    pub max_delay: Duration,

    /// Wall-clock limit for a single attempt
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Backoff before the attempt after `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        // clamp the exponent so the shift cannot overflow
        let exponent = attempt.saturating_sub(1).min(16);
        let millis = self
            .base_delay
            .as_millis()
            .saturating_mul(1u128 << exponent)
            .min(self.max_delay.as_millis());
        Duration::from_millis(millis as u64)
    }

    /// Run `operation` until it succeeds, exhausts attempts, or fails
    /// permanently
    ///
    /// Each attempt is bounded by [`attempt_timeout`]; a timeout counts as
    /// a transient failure. Cancellation during backoff returns the last
    /// error without starting another attempt.
    ///
    /// [`attempt_timeout`]: RetryPolicy::attempt_timeout
    pub async fn run<T, F, Fut>(
        &self,
        action: &str,
        key: &str,
        cancel: &CancellationToken,
        mut operation: F,
    ) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut attempt = 1u32;
        loop {
            let outcome = match tokio::time::timeout(self.attempt_timeout, operation()).await {
                Ok(outcome) => outcome,
                Err(_) => Err(StoreError::Transient(format!(
                    "{action} {key}: attempt timed out"
                ))),
            };
            match outcome {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    debug!(action, key, attempt, ?delay, error = %err, "retrying store operation");
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel.cancelled() => return Err(err),
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(40),
            attempt_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = RetryPolicy {
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(1500),
            ..RetryPolicy::default()
        };

        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(1500));
        assert_eq!(policy.delay_for(30), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let result = fast_policy()
            .run("read", "k", &CancellationToken::new(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, StoreError>(7u32) }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_are_retried() {
        let calls = AtomicU32::new(0);
        let result = fast_policy()
            .run("upload", "k", &CancellationToken::new(), || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(StoreError::Transient("flaky".to_string()))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast_policy()
            .run("upload", "k", &CancellationToken::new(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(StoreError::Transient("still down".to_string())) }
            })
            .await;

        assert!(matches!(result.unwrap_err(), StoreError::Transient(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_errors_fail_fast() {
        let calls = AtomicU32::new(0);
        let result: Result<Vec<u8>, _> = fast_policy()
            .run("read", "k", &CancellationToken::new(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(StoreError::NotFound {
                        key: "prices/2025/12/19/a.json".to_string(),
                    })
                }
            })
            .await;

        assert!(matches!(result.unwrap_err(), StoreError::NotFound { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_transient() {
        let policy = RetryPolicy {
            max_attempts: 2,
            attempt_timeout: Duration::from_millis(50),
            ..fast_policy()
        };
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = policy
            .run("upload", "k", &CancellationToken::new(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(())
                }
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, StoreError::Transient(_)));
        assert!(err.to_string().contains("timed out"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_backoff() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast_policy()
            .run("upload", "k", &cancel, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(StoreError::Transient("down".to_string())) }
            })
            .await;

        // first attempt runs, backoff is skipped, no second attempt
        assert!(matches!(result.unwrap_err(), StoreError::Transient(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
