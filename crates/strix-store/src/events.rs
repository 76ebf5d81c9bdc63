//! Per-agent event records appended to `agents/<id>/events.jsonl` (§6, §4.8).

use serde::{Deserialize, Serialize};
use strix_core::ids::ToolCallId;
use strix_core::message::MessageRole;
use strix_core::timestamp::Timestamp;

/// The event payloads §4.8 lists: "agent events (spawned, message, tool
/// call, tool result, state transition)".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentEventKind {
    /// The agent was created.
    Spawned {
        /// Parent agent, if any.
        parent_id: Option<String>,
        /// `root` / `child` / `verifier`.
        agent_kind: String,
    },
    /// A message was appended to the agent's state.
    Message {
        /// The message's role.
        role: MessageRole,
        /// A truncated preview of the message text, not the full body —
        /// the full conversation already lives in the agent's in-memory
        /// state; the trace exists for observability, not replay.
        preview: String,
    },
    /// A tool call was dispatched.
    ToolCall {
        /// The call's ID, for correlating with its result event.
        tool_call_id: ToolCallId,
        /// Tool name.
        name: String,
    },
    /// A tool call completed.
    ToolResult {
        /// The call this result corresponds to.
        tool_call_id: ToolCallId,
        /// Whether the call ended in an error.
        is_error: bool,
    },
    /// The agent's status changed.
    StateTransition {
        /// Previous status, as its `Display`/debug label.
        from: String,
        /// New status.
        to: String,
    },
}

/// One timestamped entry in an agent's event stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEvent {
    /// When the event was recorded.
    pub at: Timestamp,
    /// The event payload.
    #[serde(flatten)]
    pub kind: AgentEventKind,
}

impl AgentEvent {
    /// Wrap a payload with the current timestamp.
    #[must_use]
    pub fn now(kind: AgentEventKind) -> Self {
        Self {
            at: Timestamp::now(),
            kind,
        }
    }
}

/// Truncate a message body to a short preview for the event stream.
const PREVIEW_LEN: usize = 200;

#[must_use]
pub fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LEN {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(PREVIEW_LEN).collect();
        format!("{truncated}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_not_truncated() {
        assert_eq!(preview("hello"), "hello");
    }

    #[test]
    fn long_text_is_truncated_with_ellipsis() {
        let long = "a".repeat(PREVIEW_LEN + 50);
        let result = preview(&long);
        assert!(result.ends_with('…'));
        assert_eq!(result.chars().count(), PREVIEW_LEN + 1);
    }
}
