use crate::error::RewriteError;
use crate::retry::{RetryExecutor, RetryPolicy};
use crate::tests::helpers::fast_retry_policy;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::sleep;

#[cfg(test)]
mod tests {
    use super::*;

    // Unit Tests for RetryPolicy
    //
    // UNIT UNDER TEST: RetryPolicy (concrete implementation)
    //
    // BUSINESS RESPONSIBILITY:
    //   - Provides configuration parameters for retry behavior and timing
    //   - Defines exponential backoff progression (1s, 2s, 4s, 8s max)
    //   - Sets reasonable defaults for the Together chat completion endpoint
    //
    // TEST COVERAGE:
    //   - Default configuration values match production requirements
    //   - Single-attempt policy for callers that must not retry

    #[test]
    fn test_retry_policy_defaults_match_production_requirements() {
        // Arrange
        let policy = RetryPolicy::default();

        // Act & Assert
        assert_eq!(policy.max_attempts, 3, "Should allow 3 attempts");
        assert_eq!(policy.initial_delay, Duration::from_secs(1));
        assert_eq!(
            policy.max_delay,
            Duration::from_secs(8),
            "Should cap at 8 seconds to keep the CLI responsive"
        );
        assert_eq!(policy.backoff_multiplier, 2.0);
        assert_eq!(policy.total_timeout, Duration::from_secs(180));
        assert_eq!(policy.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_no_retry_policy_allows_one_attempt() {
        let policy = RetryPolicy::no_retry(Duration::from_secs(5));

        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.request_timeout, Duration::from_secs(5));
        assert_eq!(policy.total_timeout, Duration::from_secs(5));
    }

    // Unit Tests for RetryExecutor
    //
    // UNIT UNDER TEST: RetryExecutor (concrete implementation)
    //
    // BUSINESS RESPONSIBILITY:
    //   - Retries transient provider failures with exponential backoff
    //   - Gives up immediately on failures retrying cannot fix
    //   - Bounds each attempt by the per-request timeout
    //
    // TEST COVERAGE:
    //   - Success after transient failures
    //   - No retry for non-retryable errors
    //   - Attempt limit and per-attempt timeout
    //   - Backoff progression and jitter bounds

    #[tokio::test]
    async fn test_executor_succeeds_after_transient_failures() {
        // Arrange
        let executor = RetryExecutor::new(fast_retry_policy());
        let attempts = AtomicU32::new(0);

        // Act
        let result = executor
            .execute(|| async {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(RewriteError::request_failed("together", "reset", None))
                } else {
                    Ok("rewritten")
                }
            })
            .await;

        // Assert
        assert_eq!(result.unwrap(), "rewritten");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_executor_does_not_retry_permanent_failures() {
        // Arrange
        let executor = RetryExecutor::new(fast_retry_policy());
        let attempts = AtomicU32::new(0);

        // Act
        let result: Result<(), _> = executor
            .execute(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(RewriteError::authentication_failed("together", "bad key"))
            })
            .await;

        // Assert
        assert!(matches!(
            result,
            Err(RewriteError::AuthenticationFailed { .. })
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_executor_stops_at_max_attempts() {
        let executor = RetryExecutor::new(fast_retry_policy());
        let attempts = AtomicU32::new(0);

        let result: Result<(), _> = executor
            .execute(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(RewriteError::rate_limit_exceeded("together", 1))
            })
            .await;

        assert!(matches!(result, Err(RewriteError::RateLimitExceeded { .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_executor_times_out_slow_attempts() {
        // Test verifies the per-request timeout turns a hung call into Timeout

        let executor = RetryExecutor::new(RetryPolicy::no_retry(Duration::from_millis(20)));

        let result = executor
            .execute(|| async {
                sleep(Duration::from_millis(200)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(RewriteError::Timeout { .. })));
    }

    #[test]
    fn test_delay_grows_exponentially_and_caps() {
        // Arrange
        let executor = RetryExecutor::new(RetryPolicy::default());

        // Act
        let first = executor.calculate_delay(1);
        let second = executor.calculate_delay(2);
        let capped = executor.calculate_delay(10);

        // Assert - up to 10% jitter on top of the base delay
        assert!(first >= Duration::from_secs(1) && first <= Duration::from_millis(1100));
        assert!(second >= Duration::from_secs(2) && second <= Duration::from_millis(2200));
        assert!(capped >= Duration::from_secs(8) && capped <= Duration::from_millis(8800));
    }
}
