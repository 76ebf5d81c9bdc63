//! Cross-cutting error taxonomy for Strix operations.
//!
//! Component crates define their own narrower `thiserror` enums at their own
//! boundary (`strix_sandbox::SandboxError`, `strix_llm::GatewayError`, ...)
//! and convert into [`StrixError`] where a caller needs the unified kind —
//! the same shape as `astrid_runtime::RuntimeError` wrapping
//! `astrid_llm::LlmError` / `astrid_mcp::McpError`.

use thiserror::Error;

/// The error kinds named in the specification's error-handling design.
#[derive(Debug, Error)]
pub enum StrixError {
    /// Missing or invalid configuration (env vars, credentials). Fatal at
    /// startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// The sandbox could not be created or is no longer reachable. Fatal to
    /// the affected scan.
    #[error("sandbox unavailable: {0}")]
    SandboxUnavailable(String),

    /// A tool invocation exceeded `STRIX_SANDBOX_EXECUTION_TIMEOUT`.
    /// Returned to the agent as a tool error, not fatal to the scan.
    #[error("sandbox execution timed out after {0}s")]
    SandboxTimeout(u64),

    /// The LLM provider rate-limited a request. Retried inside the gateway;
    /// only escalates if retries are exhausted (see [`Self::LlmFatal`]).
    #[error("LLM rate limited: {0}")]
    LlmRateLimited(String),

    /// The LLM gateway exhausted its retry budget. Escalates the owning
    /// agent to `failed`.
    #[error("LLM request failed: {0}")]
    LlmFatal(String),

    /// A tool call failed. Returned to the model as a tool-result error,
    /// never terminates the agent loop.
    #[error("tool error: {0}")]
    ToolError(String),

    /// Two consecutive iterations produced no tool calls.
    #[error("agent stuck: no tool calls for two consecutive iterations")]
    AgentStuck,

    /// The agent exhausted its iteration budget.
    #[error("agent exhausted: iteration limit {0} reached")]
    AgentExhausted(usize),

    /// The scan was cancelled.
    #[error("scan cancelled")]
    Cancelled,

    /// Catch-all for errors that don't fit a named kind above.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias for fallible Strix operations.
pub type StrixResult<T> = Result<T, StrixError>;

impl StrixError {
    /// The process exit code this error kind maps to, per §6. Only
    /// meaningful for errors that escape all the way to the CLI's top
    /// level; component-internal errors are handled before reaching there.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 3,
            Self::SandboxUnavailable(_) => 3,
            Self::Cancelled => 5,
            Self::SandboxTimeout(_)
            | Self::LlmRateLimited(_)
            | Self::LlmFatal(_)
            | Self::ToolError(_)
            | Self::AgentStuck
            | Self::AgentExhausted(_)
            | Self::Internal(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_map_to_environment_not_ready() {
        assert_eq!(StrixError::Config("no docker".into()).exit_code(), 3);
    }

    #[test]
    fn cancellation_maps_to_exit_5() {
        assert_eq!(StrixError::Cancelled.exit_code(), 5);
    }

    #[test]
    fn mid_scan_failures_map_to_exit_4() {
        assert_eq!(StrixError::AgentStuck.exit_code(), 4);
        assert_eq!(StrixError::AgentExhausted(300).exit_code(), 4);
    }
}
