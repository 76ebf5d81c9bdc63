//! The concrete LLM backend HTTP client is out of this specification's
//! scope (§4.3: the client is a pluggable [`LlmProvider`] injected at this
//! seam, the same way `astrid_llm::provider::LlmProvider` separates
//! `AgentRuntime<P>` from `astrid_llm::claude`/`openai_compat`). This
//! binary wires the seam and fails fast and clearly at the first call
//! rather than silently no-opping, so a missing concrete provider shows up
//! immediately instead of as a confusing hang.

use async_trait::async_trait;
use strix_core::message::Message;
use strix_llm::{GatewayError, LlmProvider, LlmResponse, LlmToolDefinition, StreamBox};

/// A named model slot with no backend wired in.
pub struct UnconfiguredProvider {
    model: String,
}

impl UnconfiguredProvider {
    /// Name the model `strix-config` resolved, so the fatal error at least
    /// names what wasn't actually reachable.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self { model: model.into() }
    }
}

#[async_trait]
impl LlmProvider for UnconfiguredProvider {
    fn name(&self) -> &str {
        "unconfigured"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn stream(
        &self,
        _messages: &[Message],
        _tools: &[LlmToolDefinition],
        _system: &str,
    ) -> Result<StreamBox, GatewayError> {
        Err(GatewayError::Fatal(format!(
            "no concrete LLM backend wired in for model {:?}",
            self.model
        )))
    }

    async fn complete(
        &self,
        _messages: &[Message],
        _tools: &[LlmToolDefinition],
        _system: &str,
    ) -> Result<LlmResponse, GatewayError> {
        Err(GatewayError::Fatal(format!(
            "no concrete LLM backend wired in for model {:?}",
            self.model
        )))
    }

    fn max_context_length(&self) -> usize {
        200_000
    }
}
