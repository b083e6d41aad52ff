//! Retry logic with exponential backoff
//!
//! Caller-side recovery helper for the failure modes the crate deliberately leaves
//! to its users: reconnecting a dropped stream, re-reaching a briefly unavailable
//! server. Transience is decided by [`Error::is_transient`]; permanent failures are
//! returned immediately.
//!
//! Nothing inside the crate's polling loop retries through this — the poll cadence
//! is the protocol's normal operation, dictated by the server, not a retry of a
//! failure.
//!
//! # Example
//!
//! ```no_run
//! use loghive_client::{Client, RetryConfig, retry::call_with_retry};
//!
//! # async fn example() -> Result<(), loghive_client::Error> {
//! let client = Client::new("http://localhost:3000", "sandbox", "token")?;
//! let config = RetryConfig::default();
//!
//! let status = call_with_retry(&config, || client.status()).await?;
//! println!("server is {}", status.status);
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Result;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Execute an async operation, retrying transient failures with exponential backoff
///
/// Returns the first success, or the last error once the failure is permanent or
/// the attempts are exhausted.
pub async fn call_with_retry<F, Fut, T>(config: &RetryConfig, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_transient() && attempt < config.max_attempts => {
                attempt += 1;

                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis(),
                    "operation failed, retrying"
                );

                let jittered_delay = if config.jitter { add_jitter(delay) } else { delay };
                tokio::time::sleep(jittered_delay).await;

                let next_delay =
                    Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier);
                delay = next_delay.min(config.max_delay);
            }
            Err(e) => {
                if e.is_transient() {
                    tracing::error!(
                        error = %e,
                        attempts = attempt + 1,
                        "operation failed after all retry attempts exhausted"
                    );
                } else {
                    tracing::error!(error = %e, "operation failed with permanent error");
                }
                return Err(e);
            }
        }
    }
}

/// Add random jitter to a delay to prevent thundering herd
///
/// Uniformly distributed between 0% and 100% of the delay, so the actual delay is
/// between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transient() -> Error {
        Error::ConnectionDropped("stream stalled".to_string())
    }

    fn permanent() -> Error {
        Error::QueryJobExhausted
    }

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    #[tokio::test]
    async fn success_is_returned_without_retrying() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = call_with_retry(&fast_config(5), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1, "should only call once");
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = call_with_retry(&fast_config(3), || {
            let counter = counter_clone.clone();
            async move {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count < 2 { Err(transient()) } else { Ok(42) }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(
            counter.load(Ordering::SeqCst),
            3,
            "should retry twice before success"
        );
    }

    #[tokio::test]
    async fn attempts_are_bounded() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<i32> = call_with_retry(&fast_config(2), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(transient())
            }
        })
        .await;

        assert!(matches!(result, Err(Error::ConnectionDropped(_))));
        assert_eq!(
            counter.load(Ordering::SeqCst),
            3,
            "should try initial + 2 retries"
        );
    }

    #[tokio::test]
    async fn permanent_failures_are_not_retried() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<i32> = call_with_retry(&fast_config(5), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(permanent())
            }
        })
        .await;

        assert!(matches!(result, Err(Error::QueryJobExhausted)));
        assert_eq!(
            counter.load(Ordering::SeqCst),
            1,
            "should not retry a permanent error"
        );
    }

    #[tokio::test]
    async fn delays_grow_exponentially_up_to_the_cap() {
        let config = RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(20),
            max_delay: Duration::from_millis(40),
            backoff_multiplier: 2.0,
            jitter: false,
        };

        let start = std::time::Instant::now();
        let _result: Result<i32> = call_with_retry(&config, || async { Err(transient()) }).await;
        let elapsed = start.elapsed();

        // Delays: 20ms + 40ms + 40ms (capped) = 100ms.
        // Upper bound is generous to tolerate CI scheduling overhead.
        assert!(
            elapsed >= Duration::from_millis(100),
            "should wait at least 100ms, waited {elapsed:?}"
        );
        assert!(
            elapsed < Duration::from_secs(2),
            "should not wait too long, waited {elapsed:?}"
        );
    }

    // -----------------------------------------------------------------------
    // add_jitter bounds verification
    // -----------------------------------------------------------------------

    #[test]
    fn add_jitter_stays_within_bounds_over_many_iterations() {
        let delay = Duration::from_millis(50);
        for i in 0..200 {
            let jittered = add_jitter(delay);
            assert!(
                jittered >= delay,
                "iteration {i}: jittered {jittered:?} < base delay {delay:?}"
            );
            assert!(
                jittered <= delay * 2,
                "iteration {i}: jittered {jittered:?} > 2x base delay {:?}",
                delay * 2
            );
        }
    }

    #[test]
    fn add_jitter_on_zero_delay_returns_zero() {
        assert_eq!(add_jitter(Duration::ZERO), Duration::ZERO);
    }
}
