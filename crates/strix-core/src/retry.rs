//! Exponential-backoff retry helper shared by the LLM Gateway and the
//! Sandbox Runtime.

use std::time::Duration;

use rand::Rng;

/// Configuration for an exponential-backoff retry loop.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Ceiling on any single backoff delay.
    pub max_backoff: Duration,
    /// Multiplier applied to the backoff after each failed attempt.
    pub multiplier: f64,
}

impl RetryConfig {
    /// Sandbox-runtime defaults: three retries, per §4.2.
    #[must_use]
    pub fn sandbox() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }

    /// LLM-gateway defaults: a deeper ceiling since rate limits can clear
    /// slowly, but still a hard stop per §4.3.
    #[must_use]
    pub fn llm_gateway() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }

    fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let scaled = self.initial_backoff.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let capped = scaled.min(self.max_backoff.as_secs_f64());
        let jittered = rand::thread_rng().gen_range(0.5..=1.0) * capped;
        Duration::from_secs_f64(jittered)
    }
}

/// The outcome of a completed retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryOutcome {
    /// Number of attempts made (1 if it succeeded on the first try).
    pub attempts: u32,
}

/// Retry `op` up to `config.max_attempts` times with jittered exponential
/// backoff between attempts. `is_retryable` decides whether a given error
/// should be retried at all; non-retryable errors return immediately.
///
/// # Errors
///
/// Returns the last error encountered once attempts are exhausted, or
/// immediately if `is_retryable` returns `false`.
pub async fn retry<T, E, F, Fut, R>(
    config: RetryConfig,
    mut op: F,
    is_retryable: R,
) -> Result<(T, RetryOutcome), E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => {
                return Ok((
                    value,
                    RetryOutcome {
                        attempts: attempt.saturating_add(1),
                    },
                ));
            },
            Err(err) => {
                attempt = attempt.saturating_add(1);
                if attempt >= config.max_attempts || !is_retryable(&err) {
                    return Err(err);
                }
                tokio::time::sleep(config.backoff_for_attempt(attempt)).await;
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let counter = AtomicU32::new(0);
        let config = RetryConfig {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
            multiplier: 2.0,
        };

        let (value, outcome) = retry(
            config,
            || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err("transient")
                    } else {
                        Ok(42)
                    }
                }
            },
            |_| true,
        )
        .await
        .unwrap();

        assert_eq!(value, 42);
        assert_eq!(outcome.attempts, 3);
    }

    #[tokio::test]
    async fn non_retryable_errors_return_immediately() {
        let config = RetryConfig::sandbox();
        let result: Result<(i32, RetryOutcome), &str> =
            retry(config, || async { Err("fatal") }, |_| false).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn exhausts_after_max_attempts() {
        let config = RetryConfig {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
            multiplier: 2.0,
        };
        let counter = AtomicU32::new(0);
        let result: Result<(i32, RetryOutcome), &str> = retry(
            config,
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err("still failing") }
            },
            |_| true,
        )
        .await;
        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
