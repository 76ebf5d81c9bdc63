//! Wire-level LLM types: streaming events, tool definitions, responses.
//!
//! Shaped after `astrid_llm::types`, trimmed to what the gateway needs once
//! message modeling itself lives in [`strix_core::message`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool definition exported to the model's function/tool spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmToolDefinition {
    /// Tool name.
    pub name: String,
    /// Description shown to the model.
    pub description: Option<String>,
    /// Input JSON schema.
    pub input_schema: Value,
}

impl LlmToolDefinition {
    /// Create a new definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: serde_json::json!({"type": "object"}),
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Attach an input schema.
    #[must_use]
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }
}

/// A streamed event from a provider mid-generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StreamEvent {
    /// Partial assistant text.
    TextDelta(String),
    /// A tool call has begun.
    ToolCallStart {
        /// Call ID.
        id: String,
        /// Tool name.
        name: String,
    },
    /// Partial tool-call argument JSON.
    ToolCallDelta {
        /// Call ID.
        id: String,
        /// Partial arguments JSON fragment.
        args_delta: String,
    },
    /// A tool call's arguments are complete.
    ToolCallEnd {
        /// Call ID.
        id: String,
    },
    /// Partial chain-of-thought/reasoning text, when the provider exposes it.
    ReasoningDelta(String),
    /// Token accounting for the turn so far.
    Usage {
        /// Tokens in the prompt.
        input_tokens: usize,
        /// Tokens generated.
        output_tokens: usize,
        /// Tokens served from a prompt cache, if the provider reports them.
        cached_tokens: usize,
    },
    /// The stream has ended normally.
    Done,
    /// The stream ended with an error.
    Error(String),
}

/// A non-streaming response.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// The response text, if any.
    pub text: Option<String>,
    /// Tool calls requested by the model, if any.
    pub tool_calls: Vec<strix_core::message::ToolCall>,
    /// Why generation stopped.
    pub stop_reason: StopReason,
    /// Token accounting for this request.
    pub usage: Usage,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Natural end of response.
    EndTurn,
    /// Hit the configured max-tokens ceiling.
    MaxTokens,
    /// The model requested tool use.
    ToolUse,
    /// A stop sequence was hit.
    StopSequence,
}

/// Token usage for a single request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    /// Prompt tokens.
    pub input_tokens: usize,
    /// Generated tokens.
    pub output_tokens: usize,
    /// Prompt tokens served from cache (billed at a reduced rate).
    pub cached_tokens: usize,
}

impl Usage {
    /// Total tokens across input and output.
    #[must_use]
    pub fn total(&self) -> usize {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}
