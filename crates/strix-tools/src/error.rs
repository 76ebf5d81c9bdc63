//! Tool execution errors.

/// Errors a [`crate::ToolHandler`] may return.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Invalid arguments passed by the model.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool ran but failed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// A referenced path did not exist.
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// The tool's execution deadline elapsed.
    #[error("timed out after {0}ms")]
    Timeout(u64),

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}
