//! LLM Gateway errors.

/// Failure modes at the gateway boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// The provider rate-limited this request. Retried inside the gateway;
    /// only escalates to [`Self::Fatal`] once retries are exhausted.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The gateway exhausted its retry budget, or hit a non-retryable
    /// provider error. Escalates the owning agent to `failed`.
    #[error("request failed: {0}")]
    Fatal(String),

    /// The request exceeded `LLM_TIMEOUT`.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The provider stream ended abnormally mid-generation.
    #[error("stream error: {0}")]
    Stream(String),
}

impl GatewayError {
    /// Whether this error should be retried per the gateway's backoff
    /// policy.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Stream(_))
    }
}
