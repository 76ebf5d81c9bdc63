//! Bounded-deadline `/health` polling.

use std::time::{Duration, Instant};

use crate::SandboxError;

/// Poll `probe` with exponential backoff until it returns `Ok(())`, or until
/// `deadline` elapses — whichever comes first. Used both at sandbox startup
/// (§4.2: "waits for `/health` to become ready ... total deadline ≤60s") and
/// to decide a running container is unhealthy (§4.2: "treated as unhealthy
/// and recreated if `/health` fails for 30s").
///
/// # Errors
///
/// Returns [`SandboxError::HealthTimeout`] if `deadline` elapses before
/// `probe` succeeds.
pub async fn wait_until_healthy<F, Fut>(
    mut probe: F,
    deadline: Duration,
) -> Result<(), SandboxError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = Instant::now();
    let mut backoff = Duration::from_millis(200);
    const MAX_BACKOFF: Duration = Duration::from_secs(5);

    loop {
        if probe().await {
            return Ok(());
        }
        if start.elapsed() >= deadline {
            return Err(SandboxError::HealthTimeout(deadline.as_secs()));
        }
        let remaining = deadline.saturating_sub(start.elapsed());
        tokio::time::sleep(backoff.min(remaining)).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test]
    async fn succeeds_once_probe_returns_true() {
        let attempts = AtomicU32::new(0);
        let result = wait_until_healthy(
            || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move { n >= 2 }
            },
            Duration::from_secs(5),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn times_out_if_never_healthy() {
        let result = wait_until_healthy(|| async { false }, Duration::from_millis(50)).await;
        assert!(matches!(result, Err(SandboxError::HealthTimeout(_))));
    }
}
