//! Condition polling.
//!
//! Screens never sleep for a fixed time and hope the application caught up.
//! They poll a check until it reports a value, backing off between checks,
//! and give up when the timeout tier for that kind of wait elapses.

use crate::config::PollingConfig;
use crate::result::{TenfootError, TenfootResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// TIMEOUT TIERS
// =============================================================================

/// Named timeout classes, resolved through [`crate::config::Timeouts`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeoutTier {
    /// Quick checks (2s)
    Short,
    /// Element waits (5s)
    Medium,
    /// Slow screens (10s)
    Long,
    /// Page transitions (15s)
    Navigation,
}

impl TimeoutTier {
    /// Every tier
    pub const ALL: [Self; 4] = [Self::Short, Self::Medium, Self::Long, Self::Navigation];
}

impl std::fmt::Display for TimeoutTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
            Self::Navigation => "navigation",
        };
        f.write_str(name)
    }
}

// =============================================================================
// POLL OPTIONS
// =============================================================================

/// Options for one polling loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollOptions {
    /// Give up after this long
    pub timeout: Duration,
    /// First interval between checks
    pub initial_interval: Duration,
    /// Interval ceiling
    pub max_interval: Duration,
    /// Interval growth per check
    pub backoff_factor: f64,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::from_config(&PollingConfig::default(), Duration::from_secs(5))
    }
}

impl PollOptions {
    /// Options from the polling section and a timeout
    #[must_use]
    pub const fn from_config(polling: &PollingConfig, timeout: Duration) -> Self {
        Self {
            timeout,
            initial_interval: polling.initial_interval,
            max_interval: polling.max_interval,
            backoff_factor: polling.backoff_factor,
        }
    }

    /// Set timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn next_interval(&self, current: Duration) -> Duration {
        // Overflow or a non-finite factor lands on the ceiling
        Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff_factor.max(1.0))
            .map_or(self.max_interval, |next| next.min(self.max_interval))
    }
}

// =============================================================================
// OUTCOME
// =============================================================================

/// Result of a polling loop
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome<T> {
    /// Check produced a value
    Ready {
        /// The value
        value: T,
        /// Time spent
        elapsed: Duration,
        /// Checks made
        attempts: usize,
    },
    /// Timeout elapsed first
    TimedOut {
        /// Time spent
        elapsed: Duration,
        /// Checks made
        attempts: usize,
    },
}

impl<T> WaitOutcome<T> {
    /// Whether the check succeeded
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// The value, if any
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Ready { value, .. } => Some(value),
            Self::TimedOut { .. } => None,
        }
    }

    /// Checks made
    #[must_use]
    pub const fn attempts(&self) -> usize {
        match self {
            Self::Ready { attempts, .. } | Self::TimedOut { attempts, .. } => *attempts,
        }
    }

    /// Convert a timeout into [`TenfootError::Precondition`]
    pub fn or_precondition(self, what: impl Into<String>, timeout: Duration) -> TenfootResult<T> {
        match self {
            Self::Ready { value, .. } => Ok(value),
            Self::TimedOut { .. } => Err(TenfootError::precondition(
                what,
                timeout.as_millis() as u64,
            )),
        }
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Sleep unless `duration` is zero
pub(crate) async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// Poll `check` until it yields `Some`, or the timeout elapses.
///
/// The check is always called at least once. Check errors abort the loop.
///
/// # Errors
///
/// Propagates the first error returned by `check`.
pub async fn poll_until<T, F, Fut>(
    description: &str,
    options: &PollOptions,
    mut check: F,
) -> TenfootResult<WaitOutcome<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = TenfootResult<Option<T>>>,
{
    let start = Instant::now();
    let deadline = start + options.timeout;
    let mut interval = options.initial_interval;
    let mut attempts = 0;

    loop {
        attempts += 1;
        if let Some(value) = check().await? {
            let elapsed = start.elapsed();
            tracing::trace!(description, attempts, ?elapsed, "condition met");
            return Ok(WaitOutcome::Ready {
                value,
                elapsed,
                attempts,
            });
        }

        let now = Instant::now();
        if now >= deadline {
            let elapsed = start.elapsed();
            tracing::debug!(description, attempts, ?elapsed, "condition timed out");
            return Ok(WaitOutcome::TimedOut { elapsed, attempts });
        }

        tokio::time::sleep(interval.min(deadline - now)).await;
        interval = options.next_interval(interval);
    }
}
