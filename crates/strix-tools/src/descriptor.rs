//! Tool descriptors: `{handler, runs-in-sandbox, parallelizable, schema}`.

use serde_json::Value;

use crate::ToolError;

/// Result of a tool invocation.
pub type ToolResult = Result<String, ToolError>;

/// A tool's handler body. Implementations live outside this crate — the
/// registry only needs to call them, not know what they do.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool against the given arguments, returning its textual
    /// result.
    async fn call(&self, args: Value) -> ToolResult;
}

/// Canonical description of one tool: its schema and scheduling metadata.
pub struct ToolDescriptor {
    /// Tool name, as emitted by the model's tool calls.
    pub name: String,
    /// Human-readable description, surfaced in the LLM's tool spec.
    pub description: String,
    /// JSON schema for the tool's input parameters.
    pub input_schema: Value,
    /// Whether this tool's calls must be routed through the Sandbox Runtime
    /// rather than executed host-locally.
    pub runs_in_sandbox: bool,
    /// Whether this tool may run concurrently with other parallelizable
    /// tools in the same batch (§4.5).
    pub parallelizable: bool,
    /// The handler body.
    pub handler: Box<dyn ToolHandler>,
}

impl ToolDescriptor {
    /// Build a descriptor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        runs_in_sandbox: bool,
        parallelizable: bool,
        handler: Box<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            runs_in_sandbox,
            parallelizable,
            handler,
        }
    }
}
