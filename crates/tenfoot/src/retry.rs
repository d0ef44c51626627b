//! Retry with exponential backoff for whole actions.
//!
//! Distinct from [`crate::wait::poll_until`]: polling re-checks a condition,
//! retry re-runs an action that failed.

use crate::config::Settings;
use crate::result::TenfootResult;
use std::future::Future;
use std::time::Duration;

/// Default base delay between attempts
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts (at least one is always made)
    pub max_attempts: usize,
    /// Backoff unit: failed attempt `n` is followed by `base_delay * 2^n`
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Create a policy
    #[must_use]
    pub const fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Policy from `test_data.max_retry_attempts`
    #[must_use]
    pub const fn from_settings(settings: &Settings) -> Self {
        Self {
            max_attempts: settings.test_data.max_retry_attempts,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }

    /// Set base delay
    #[must_use]
    pub const fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Sleep after failed attempt `attempt` (1-based)
    #[must_use]
    pub fn delay_after(&self, attempt: usize) -> Duration {
        let exponent = u32::try_from(attempt).unwrap_or(u32::MAX).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }
}

/// Run `action` until it succeeds or the policy's attempts are spent.
///
/// # Errors
///
/// Returns the error of the last attempt.
pub async fn retry_action<T, F, Fut>(
    policy: &RetryPolicy,
    description: &str,
    mut action: F,
) -> TenfootResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = TenfootResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match action().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    description,
                    attempt,
                    max_attempts,
                    ?delay,
                    error = %err,
                    "attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                tracing::warn!(description, attempt, error = %err, "all attempts failed");
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::TenfootError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn instant_policy(max_attempts: usize) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_secs(2));
        assert_eq!(policy.delay_after(2), Duration::from_secs(4));
        assert_eq!(policy.delay_after(3), Duration::from_secs(8));
    }

    #[test]
    fn test_from_settings() {
        let mut settings = Settings::default();
        settings.test_data.max_retry_attempts = 5;
        assert_eq!(RetryPolicy::from_settings(&settings).max_attempts, 5);
    }

    #[tokio::test]
    async fn test_succeeds_after_failures() {
        let calls = AtomicUsize::new(0);
        let value = retry_action(&instant_policy(3), "flaky", || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(TenfootError::evaluation("not yet"))
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(value, 3);
    }

    #[tokio::test]
    async fn test_returns_last_error() {
        let calls = AtomicUsize::new(0);
        let err = retry_action(&instant_policy(2), "always fails", || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Err::<(), _>(TenfootError::postcondition(format!("attempt {n}"))) }
        })
        .await
        .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(err.to_string().contains("attempt 2"));
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let calls = AtomicUsize::new(0);
        let _ = retry_action(&instant_policy(0), "once", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
