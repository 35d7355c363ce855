//! Retry logic with exponential backoff
//!
//! Provider calls that fail with a retryable [`RewriteError`] (request
//! failures, rate limits, timeouts) are retried with exponential backoff and
//! up to 10% jitter, bounded by a per-attempt and a total timeout.

use crate::error::{RewriteError, RewriteResult};
use crate::logging::{log_debug, log_error};

use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Retry policy configuration for provider requests
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum total operation time
    pub total_timeout: Duration,
    /// Request timeout for individual attempts
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(8),
            backoff_multiplier: 2.0,
            total_timeout: Duration::from_secs(180),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no backoff.
    pub fn no_retry(request_timeout: Duration) -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            total_timeout: request_timeout,
            request_timeout,
        }
    }
}

/// Retry executor that handles exponential backoff
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute an operation with retry logic
    pub async fn execute<F, Fut, T>(&self, operation: F) -> RewriteResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = RewriteResult<T>>,
    {
        let start_time = Instant::now();
        let mut attempt = 0;
        let mut last_error = None;

        while attempt < self.policy.max_attempts.max(1) {
            if start_time.elapsed() >= self.policy.total_timeout {
                last_error = Some(RewriteError::timeout(self.policy.total_timeout.as_secs()));
                break;
            }

            attempt += 1;
            log_debug!(
                attempt = attempt,
                max_attempts = self.policy.max_attempts,
                "Executing request with retry logic"
            );

            let error = match tokio::time::timeout(self.policy.request_timeout, operation()).await
            {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(error)) => error,
                Err(_elapsed) => RewriteError::timeout(self.policy.request_timeout.as_secs()),
            };

            let should_retry = error.is_retryable() && attempt < self.policy.max_attempts;
            last_error = Some(error);
            if !should_retry {
                break;
            }

            let delay = self.calculate_delay(attempt);
            log_debug!(
                attempt = attempt,
                delay_ms = delay.as_millis(),
                error = ?last_error.as_ref(),
                "Request failed, retrying after delay"
            );
            sleep(delay).await;
        }

        let final_error = last_error.unwrap_or_else(|| {
            RewriteError::request_failed("retry", "Maximum retry attempts exceeded", None)
        });

        log_error!(
            attempts = attempt,
            total_duration_ms = start_time.elapsed().as_millis(),
            error = %final_error,
            "Request failed after all retry attempts"
        );

        Err(final_error)
    }

    /// Calculate delay for exponential backoff
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let delay_seconds =
            self.policy.initial_delay.as_secs_f64() * self.policy.backoff_multiplier.powi(exponent);

        let delay = delay_seconds.min(self.policy.max_delay.as_secs_f64());

        // Add jitter to prevent thundering herd
        let jitter = fastrand::f64() * 0.1; // Up to 10% jitter
        Duration::from_secs_f64(delay * (1.0 + jitter))
    }
}
