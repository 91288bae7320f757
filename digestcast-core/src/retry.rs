//! Retry with exponential backoff for remote calls
//!
//! Callers supply the operation and a classifier that decides, per error,
//! whether another attempt is worthwhile. Terminal errors are returned
//! immediately; transient ones are retried until the attempt budget is spent,
//! after which the last error is handed back unchanged.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Upper bound on attempts accepted by [`RetryPolicy::validate`]
pub const MAX_ATTEMPTS_LIMIT: u32 = 10;

/// Upper bound on a single backoff delay accepted by [`RetryPolicy::validate`]
pub const MAX_DELAY_LIMIT_MS: u64 = 300_000;

/// Backoff schedule for a retried operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Delay before the second attempt, in milliseconds
    pub base_delay_ms: u64,

    /// Cap applied to every delay, in milliseconds
    pub max_delay_ms: u64,

    /// Growth factor between consecutive delays
    pub multiplier: f64,

    /// Spread each delay by up to 10% in either direction
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 60_000,
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Validate retry policy
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("Retry max_attempts must be at least 1".to_string());
        }

        if self.max_attempts > MAX_ATTEMPTS_LIMIT {
            return Err(format!(
                "Retry max_attempts too large (max {})",
                MAX_ATTEMPTS_LIMIT
            ));
        }

        if self.max_delay_ms > MAX_DELAY_LIMIT_MS {
            return Err(format!(
                "Retry max_delay_ms too large (max {} ms)",
                MAX_DELAY_LIMIT_MS
            ));
        }

        if self.base_delay_ms > self.max_delay_ms {
            return Err("Retry base_delay_ms cannot be greater than max_delay_ms".to_string());
        }

        if !(self.multiplier >= 1.0 && self.multiplier.is_finite()) {
            return Err("Retry multiplier must be a finite number >= 1.0".to_string());
        }

        Ok(())
    }

    /// Longest delay this policy will ever wait
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Delay to wait after the failed attempt with the given 0-based index
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let raw = self.base_delay_ms as f64 * self.multiplier.powi(exponent);
        let mut delay_ms = raw.min(self.max_delay_ms as f64);

        if self.jitter && delay_ms > 0.0 {
            let spread = delay_ms * 0.1;
            delay_ms += rand::thread_rng().gen_range(-spread..=spread);
        }

        Duration::from_millis(delay_ms.max(0.0).round() as u64)
    }
}

/// Outcome of classifying a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again; `after` overrides the computed backoff when the remote side asked for a wait
    Retry { after: Option<Duration> },
    /// Give up and return the error as-is
    Abort,
}

impl RetryDecision {
    pub fn retry() -> Self {
        RetryDecision::Retry { after: None }
    }
}

/// Run `operation` under `policy`, retrying while `classify` says so.
///
/// At most `policy.max_attempts` attempts are made. A hinted delay from
/// [`RetryDecision::Retry`] is still capped by `policy.max_delay_ms`.
pub async fn retry_with_backoff<T, E, Op, Fut, C>(
    policy: &RetryPolicy,
    operation_name: &str,
    classify: C,
    mut operation: Op,
) -> Result<T, E>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> RetryDecision,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        let err = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(
                        "{} succeeded on attempt {}/{}",
                        operation_name, attempt, max_attempts
                    );
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        let hinted = match classify(&err) {
            RetryDecision::Abort => {
                error!("{} failed with non-retryable error: {}", operation_name, err);
                return Err(err);
            }
            RetryDecision::Retry { after } => after,
        };

        if attempt >= max_attempts {
            error!("{} failed after {} attempts: {}", operation_name, max_attempts, err);
            return Err(err);
        }

        let delay = match hinted {
            Some(after) => after.min(policy.max_delay()),
            None => policy.delay_for(attempt - 1),
        };

        warn!(
            "{} attempt {}/{} failed: {}. Retrying in {}ms",
            operation_name,
            attempt,
            max_attempts,
            err,
            delay.as_millis()
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Flaky,
        Fatal,
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                TestError::Flaky => write!(f, "flaky"),
                TestError::Fatal => write!(f, "fatal"),
            }
        }
    }

    fn classify(err: &TestError) -> RetryDecision {
        match err {
            TestError::Flaky => RetryDecision::retry(),
            TestError::Fatal => RetryDecision::Abort,
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay_ms: 1,
            max_delay_ms: 5,
            multiplier: 2.0,
            jitter: false,
        }
    }

    #[test]
    fn test_default_policy_is_valid() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_policy_validation_bounds() {
        let mut policy = RetryPolicy::default();
        policy.max_attempts = 0;
        assert!(policy.validate().is_err());

        policy.max_attempts = MAX_ATTEMPTS_LIMIT + 1;
        assert!(policy.validate().is_err());

        policy = RetryPolicy::default();
        policy.base_delay_ms = policy.max_delay_ms + 1;
        assert!(policy.validate().is_err());

        policy = RetryPolicy::default();
        policy.multiplier = 0.5;
        assert!(policy.validate().is_err());

        policy.multiplier = f64::NAN;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_delay_grows_exponentially_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay_ms: 100,
            max_delay_ms: 500,
            multiplier: 2.0,
            jitter: false,
        };

        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for(3), Duration::from_millis(500));
        assert_eq!(policy.delay_for(40), Duration::from_millis(500));
    }

    #[test]
    fn test_jitter_stays_within_ten_percent() {
        let policy = RetryPolicy {
            base_delay_ms: 1_000,
            jitter: true,
            ..RetryPolicy::default()
        };

        for _ in 0..100 {
            let delay = policy.delay_for(0).as_millis();
            assert!((900..=1_100).contains(&delay), "delay {} out of range", delay);
        }
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let mut calls = 0u32;
        let result = retry_with_backoff(&fast_policy(3), "op", classify, || {
            calls += 1;
            let n = calls;
            async move {
                if n < 3 {
                    Err(TestError::Flaky)
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_exhausts_attempts_and_returns_last_error() {
        let mut calls = 0u32;
        let result: Result<(), TestError> =
            retry_with_backoff(&fast_policy(4), "op", classify, || {
                calls += 1;
                async { Err(TestError::Flaky) }
            })
            .await;

        assert_eq!(result, Err(TestError::Flaky));
        assert_eq!(calls, 4);
    }

    #[tokio::test]
    async fn test_terminal_error_is_not_retried() {
        let mut calls = 0u32;
        let result: Result<(), TestError> =
            retry_with_backoff(&fast_policy(5), "op", classify, || {
                calls += 1;
                async { Err(TestError::Fatal) }
            })
            .await;

        assert_eq!(result, Err(TestError::Fatal));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let mut calls = 0u32;
        let result: Result<(), TestError> =
            retry_with_backoff(&fast_policy(0), "op", classify, || {
                calls += 1;
                async { Err(TestError::Flaky) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_hinted_delay_is_capped() {
        let policy = fast_policy(2);
        let mut calls = 0u32;
        let started = std::time::Instant::now();
        let result = retry_with_backoff(
            &policy,
            "op",
            |_: &TestError| RetryDecision::Retry {
                after: Some(Duration::from_secs(30)),
            },
            || {
                calls += 1;
                let n = calls;
                async move {
                    if n == 1 {
                        Err(TestError::Flaky)
                    } else {
                        Ok(())
                    }
                }
            },
        )
        .await;

        assert!(result.is_ok());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
