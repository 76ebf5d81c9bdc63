//! Dispatch of a single tool call to its host-local handler or, for
//! sandboxed tools, through the Sandbox Runtime.

use strix_core::ids::AgentId;
use strix_core::message::{Message, ToolCall};
use strix_sandbox::{Sandbox, SandboxRuntime};
use strix_tools::{ToolRegistry, truncate_output};

/// The sandbox a call may be routed through, if the agent has one.
pub struct SandboxContext<'a> {
    /// The Sandbox Runtime driving lifecycle and dispatch.
    pub runtime: &'a SandboxRuntime,
    /// The sandbox handle this agent's calls are routed through.
    pub sandbox: &'a Sandbox,
}

/// Execute one tool call, mutating it in place with start/end timestamps
/// and outcome, and returning the tool-result message to append to state.
pub async fn dispatch(
    registry: &ToolRegistry,
    sandbox: Option<&SandboxContext<'_>>,
    agent_id: &AgentId,
    call: &mut ToolCall,
) -> Message {
    call.mark_started();

    let Some(descriptor) = registry.get(&call.name) else {
        call.fail(format!("unknown tool: {}", call.name));
        return Message::tool_result(call.id.clone(), format!("unknown tool: {}", call.name));
    };

    let outcome = if descriptor.runs_in_sandbox {
        match sandbox {
            Some(ctx) => ctx
                .runtime
                .execute(ctx.sandbox, agent_id, &call.name, call.args.clone())
                .await
                .map_err(|e| e.to_string()),
            None => Err(format!("tool {} requires a sandbox, none attached", call.name)),
        }
    } else {
        descriptor.handler.call(call.args.clone()).await.map_err(|e| e.to_string())
    };

    match outcome {
        Ok(result) => {
            let result = truncate_output(result);
            call.complete(result.clone());
            Message::tool_result(call.id.clone(), result)
        },
        Err(error) => {
            call.fail(error.clone());
            Message::tool_result(call.id.clone(), error)
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn unknown_tool_reports_error() {
        let registry = ToolRegistry::new();
        let mut call = ToolCall::new("nonexistent", json!({}));
        let msg = dispatch(&registry, None, &AgentId::new(), &mut call).await;
        assert!(call.is_error());
        assert!(msg.text.unwrap().contains("unknown tool"));
    }
}
