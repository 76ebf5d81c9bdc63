//! The provider seam: `astrid_llm::provider::LlmProvider`, generalized from
//! a single concrete backend to whatever the gateway is configured with.
//! The HTTP client bodies (Claude, `OpenAI`-compatible, ...) are out of
//! scope here — only the trait and its blanket `Box<dyn LlmProvider>` impl
//! live in this crate.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use strix_core::message::Message;

use crate::error::GatewayError;
use crate::types::{LlmResponse, LlmToolDefinition, StreamEvent};

/// A boxed stream of provider events.
pub type StreamBox = Pin<Box<dyn Stream<Item = Result<StreamEvent, GatewayError>> + Send>>;

/// Abstraction over a concrete model backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name, e.g. `"anthropic"`.
    fn name(&self) -> &str;

    /// Model identifier in use.
    fn model(&self) -> &str;

    /// Stream a completion, given the conversation so far, the available
    /// tools, and a system prompt.
    async fn stream(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
    ) -> Result<StreamBox, GatewayError>;

    /// Complete without streaming.
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
    ) -> Result<LlmResponse, GatewayError>;

    /// Simple text-only completion, used by the Memory Compressor to
    /// request a summary.
    async fn complete_simple(&self, prompt: &str) -> Result<String, GatewayError> {
        let messages = vec![Message::user(prompt)];
        let response = self.complete(&messages, &[], "").await?;
        Ok(response.text.unwrap_or_default())
    }

    /// Approximate token count for a string. Providers that know their
    /// exact tokenizer should override this; the default falls back to the
    /// same ~4-chars-per-token estimate the teacher's default uses.
    fn count_tokens(&self, text: &str) -> usize {
        text.len() / 4
    }

    /// Maximum context window for the configured model, in tokens.
    fn max_context_length(&self) -> usize;
}

#[async_trait]
impl LlmProvider for Box<dyn LlmProvider> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn model(&self) -> &str {
        (**self).model()
    }

    async fn stream(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
    ) -> Result<StreamBox, GatewayError> {
        (**self).stream(messages, tools, system).await
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
    ) -> Result<LlmResponse, GatewayError> {
        (**self).complete(messages, tools, system).await
    }

    fn count_tokens(&self, text: &str) -> usize {
        (**self).count_tokens(text)
    }

    fn max_context_length(&self) -> usize {
        (**self).max_context_length()
    }
}
