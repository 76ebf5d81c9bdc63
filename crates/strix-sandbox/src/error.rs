//! Sandbox Runtime errors.

/// Failure modes specific to sandbox lifecycle and dispatch.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// The Docker daemon could not be reached.
    #[error("docker unavailable: {0}")]
    DockerUnavailable(String),

    /// The sandbox image could not be pulled or the container failed to
    /// start.
    #[error("sandbox container failed to start: {0}")]
    StartFailed(String),

    /// `/health` did not become ready within the deadline.
    #[error("sandbox health check timed out after {0}s")]
    HealthTimeout(u64),

    /// A tool invocation exceeded `STRIX_SANDBOX_EXECUTION_TIMEOUT`.
    #[error("tool execution timed out after {0}s")]
    ExecutionTimeout(u64),

    /// The in-container worker returned an error for a dispatched call.
    #[error("tool execution failed: {0}")]
    ExecutionFailed(String),

    /// `register_agent` could not fork a dedicated worker.
    #[error("worker registration failed: {0}")]
    WorkerRegistrationFailed(String),

    /// Transport-level failure talking to the container (connection
    /// refused, reset, etc.) — distinct from [`Self::ExecutionFailed`]
    /// because the gateway's retry policy treats it as transient.
    #[error("sandbox transport error: {0}")]
    Transport(String),
}

impl SandboxError {
    /// Whether this error is worth retrying under §4.2's "transient HTTP
    /// errors and connection failures are retried up to three times"
    /// policy.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
