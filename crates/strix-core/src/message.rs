//! Conversation messages and tool calls.
//!
//! Mirrors the shape of `astrid_llm::types::{Message, ToolCall,
//! ToolCallResult}`, generalised so a single `Message` can carry the bounded
//! image attachments the memory compressor (`strix-memory`) manages and the
//! richer per-call timing the verification pipeline logs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::ToolCallId;
use crate::timestamp::Timestamp;

/// Role of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// System/instruction message.
    System,
    /// User-authored message (task, inter-agent mail delivered as text).
    User,
    /// Assistant (model) message, possibly carrying tool calls.
    Assistant,
    /// Tool-result message appended after dispatch.
    ToolResult,
}

/// An image attached to a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAttachment {
    /// Base64-encoded image bytes.
    pub data: String,
    /// MIME type, e.g. `image/png`.
    pub media_type: String,
}

/// A single message in an agent's conversation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message role.
    pub role: MessageRole,
    /// Text content, if any.
    pub text: Option<String>,
    /// Attached images (bounded by the memory compressor, never here).
    #[serde(default)]
    pub images: Vec<ImageAttachment>,
    /// Tool calls requested by this message (assistant messages only).
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    /// The call this message responds to (tool-result messages only).
    #[serde(default)]
    pub tool_call_id: Option<ToolCallId>,
}

impl Message {
    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            text: Some(text.into()),
            images: Vec::new(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: Some(text.into()),
            images: Vec::new(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create an assistant text message (no tool calls).
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            text: Some(text.into()),
            images: Vec::new(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create an assistant message carrying tool calls.
    #[must_use]
    pub fn assistant_with_tools(text: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            text,
            images: Vec::new(),
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Create a tool-result message responding to a single completed call.
    #[must_use]
    pub fn tool_result(call_id: ToolCallId, text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::ToolResult,
            text: Some(text.into()),
            images: Vec::new(),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id),
        }
    }

    /// Whether this message carries any tool calls.
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Rough token estimate for this message (~4 chars/token, matching the
    /// default `LlmProvider::count_tokens` approximation the gateway falls
    /// back to when a provider doesn't override it).
    #[must_use]
    pub fn approx_tokens(&self) -> usize {
        let text_len = self.text.as_deref().map_or(0, str::len);
        let call_len: usize = self
            .tool_calls
            .iter()
            .map(|c| c.name.len().saturating_add(c.args.to_string().len()))
            .sum();
        text_len.saturating_add(call_len).saturating_add(1) / 4
    }
}

/// A tool call requested by the model within an assistant message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (stable across retries for ordering).
    pub id: ToolCallId,
    /// Tool name as registered in the Tool Registry.
    pub name: String,
    /// Tool arguments.
    pub args: Value,
    /// When dispatch began.
    pub started_at: Option<Timestamp>,
    /// When dispatch completed.
    pub ended_at: Option<Timestamp>,
    /// Outcome, once dispatched.
    pub outcome: Option<ToolCallOutcome>,
}

impl ToolCall {
    /// Create a new, not-yet-dispatched tool call.
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            id: ToolCallId::new(),
            name: name.into(),
            args,
            started_at: None,
            ended_at: None,
            outcome: None,
        }
    }

    /// Mark dispatch as started.
    pub fn mark_started(&mut self) {
        self.started_at = Some(Timestamp::now());
    }

    /// Record a successful outcome.
    pub fn complete(&mut self, result: impl Into<String>) {
        self.ended_at = Some(Timestamp::now());
        self.outcome = Some(ToolCallOutcome::Result(result.into()));
    }

    /// Record an error outcome. Tool errors are returned to the model as
    /// tool-result messages, never treated as fatal to the agent loop.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.ended_at = Some(Timestamp::now());
        self.outcome = Some(ToolCallOutcome::Error(error.into()));
    }

    /// Whether this call finished as an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Some(ToolCallOutcome::Error(_)))
    }
}

/// The outcome of a dispatched tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ToolCallOutcome {
    /// Successful result content.
    Result(String),
    /// Error content (serialised back to the model).
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_with_tools_carries_calls() {
        let call = ToolCall::new("read_file", serde_json::json!({"path": "a.rs"}));
        let msg = Message::assistant_with_tools(None, vec![call]);
        assert!(msg.has_tool_calls());
    }

    #[test]
    fn tool_call_lifecycle() {
        let mut call = ToolCall::new("bash", serde_json::json!({"cmd": "ls"}));
        call.mark_started();
        assert!(call.started_at.is_some());
        call.complete("ok");
        assert!(!call.is_error());
        call.fail("boom");
        assert!(call.is_error());
    }

    #[test]
    fn approx_tokens_nonzero_for_text() {
        let msg = Message::user("hello world");
        assert!(msg.approx_tokens() > 0);
    }
}
