//! The compression algorithm itself.

use strix_core::message::{Message, MessageRole};
use strix_llm::LlmProvider;

use crate::cache::SummaryCache;
use crate::image::cap_images;

/// Always-verbatim tail length, per §4.4.
pub const KEEP_RECENT_COUNT: usize = 15;
/// Token-estimate threshold above which older messages get folded.
pub const TOKEN_THRESHOLD: usize = 90_000;
/// Chunk size for folding older messages into summaries.
pub const CHUNK_SIZE: usize = 10;

const SUMMARY_PROMPT_PREFIX: &str = "Summarize the following conversation excerpt, preserving \
key facts, decisions, and context that would matter for continuing the task:\n\n";

/// Outcome of a single [`MemoryCompressor::compress`] call, surfaced for
/// logging and the Run Store's periodic statistics snapshot.
#[derive(Debug, Clone, Default)]
pub struct CompressionStats {
    /// Messages present before compression.
    pub messages_in: usize,
    /// Messages present after compression.
    pub messages_out: usize,
    /// Approximate tokens before compression.
    pub tokens_in: usize,
    /// Approximate tokens after compression.
    pub tokens_out: usize,
    /// Number of 10-message chunks folded into summaries.
    pub chunks_summarized: usize,
    /// Number of chunks that fell back to truncation because
    /// summarization failed.
    pub chunks_truncated: usize,
}

/// Bounds the conversation view sent to the model. Pure with respect to
/// the caller's message history: `compress` takes a slice and returns a new
/// `Vec`, never mutating its input.
pub struct MemoryCompressor {
    keep_recent_count: usize,
    token_threshold: usize,
    chunk_size: usize,
    cache: SummaryCache,
}

impl MemoryCompressor {
    /// A compressor using the specification's defaults (15 / 90k / 10).
    #[must_use]
    pub fn new() -> Self {
        Self {
            keep_recent_count: KEEP_RECENT_COUNT,
            token_threshold: TOKEN_THRESHOLD,
            chunk_size: CHUNK_SIZE,
            cache: SummaryCache::new(),
        }
    }

    fn total_tokens(messages: &[Message]) -> usize {
        messages.iter().map(Message::approx_tokens).sum()
    }

    /// Produce a compressed view of `messages` acceptable to the model.
    ///
    /// Never mutates `messages`. If summarization fails (the provider
    /// errors), falls back to truncating that chunk's text rather than
    /// propagating the error — a degraded context is preferable to
    /// aborting the agent loop over a summarization hiccup.
    pub async fn compress<P: LlmProvider>(
        &self,
        messages: &[Message],
        provider: &P,
    ) -> (Vec<Message>, CompressionStats) {
        let tokens_in = Self::total_tokens(messages);
        let mut stats = CompressionStats {
            messages_in: messages.len(),
            tokens_in,
            ..Default::default()
        };

        if tokens_in <= self.token_threshold || messages.len() <= self.keep_recent_count {
            let out = cap_images(messages);
            stats.messages_out = out.len();
            stats.tokens_out = Self::total_tokens(&out);
            return (out, stats);
        }

        let split_at = messages.len() - self.keep_recent_count;
        let (older, recent) = messages.split_at(split_at);

        let folded_older = self.fold(older, provider, &mut stats).await;

        let mut out = folded_older;
        out.extend_from_slice(recent);
        let out = cap_images(&out);

        stats.messages_out = out.len();
        stats.tokens_out = Self::total_tokens(&out);
        (out, stats)
    }

    async fn fold<P: LlmProvider>(
        &self,
        older: &[Message],
        provider: &P,
        stats: &mut CompressionStats,
    ) -> Vec<Message> {
        let mut out = Vec::new();
        let mut pending: Vec<&Message> = Vec::new();

        for message in older {
            if matches!(message.role, MessageRole::System) {
                if !pending.is_empty() {
                    out.push(self.summarize_chunk(&pending, provider, stats).await);
                    pending.clear();
                }
                out.push(message.clone());
                continue;
            }

            pending.push(message);
            if pending.len() >= self.chunk_size {
                out.push(self.summarize_chunk(&pending, provider, stats).await);
                pending.clear();
            }
        }

        if !pending.is_empty() {
            out.push(self.summarize_chunk(&pending, provider, stats).await);
        }

        out
    }

    async fn summarize_chunk<P: LlmProvider>(
        &self,
        chunk: &[&Message],
        provider: &P,
        stats: &mut CompressionStats,
    ) -> Message {
        let chunk_text = format_chunk(chunk);
        let key = strix_crypto::ContentHash::hash(chunk_text.as_bytes());

        if let Some(cached) = self.cache.get(&key).await {
            return Message::system(format!("[summary]\n{cached}"));
        }

        let prompt = format!("{SUMMARY_PROMPT_PREFIX}{chunk_text}");
        match provider.complete_simple(&prompt).await {
            Ok(summary) => {
                self.cache.insert(key, summary.clone()).await;
                stats.chunks_summarized += 1;
                Message::system(format!("[summary]\n{summary}"))
            },
            Err(err) => {
                tracing::warn!(error = %err, "summarization failed, falling back to truncation");
                stats.chunks_truncated += 1;
                Message::system(format!("[truncated]\n{}", truncate(&chunk_text, 500)))
            },
        }
    }
}

impl Default for MemoryCompressor {
    fn default() -> Self {
        Self::new()
    }
}

fn format_chunk(chunk: &[&Message]) -> String {
    chunk
        .iter()
        .map(|m| {
            let role = match m.role {
                MessageRole::System => "System",
                MessageRole::User => "User",
                MessageRole::Assistant => "Assistant",
                MessageRole::ToolResult => "Tool",
            };
            let text = m.text.as_deref().unwrap_or("");
            format!("{role}: {text}")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use strix_llm::provider::StreamBox;
    use strix_llm::{GatewayError, LlmResponse, LlmToolDefinition, StopReason, Usage};

    use super::*;

    struct FixedProvider {
        fail: bool,
    }

    #[async_trait]
    impl LlmProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }
        fn model(&self) -> &str {
            "fixed-model"
        }
        async fn stream(
            &self,
            _messages: &[Message],
            _tools: &[LlmToolDefinition],
            _system: &str,
        ) -> Result<StreamBox, GatewayError> {
            unimplemented!()
        }
        async fn complete(
            &self,
            _messages: &[Message],
            _tools: &[LlmToolDefinition],
            _system: &str,
        ) -> Result<LlmResponse, GatewayError> {
            unimplemented!()
        }
        async fn complete_simple(&self, _prompt: &str) -> Result<String, GatewayError> {
            if self.fail {
                Err(GatewayError::Fatal("boom".into()))
            } else {
                Ok("a short summary".into())
            }
        }
        fn max_context_length(&self) -> usize {
            200_000
        }
    }

    fn long_history(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| Message::user("x".repeat(4000) + &i.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn under_threshold_is_passed_through_unchanged() {
        let compressor = MemoryCompressor::new();
        let messages = vec![Message::user("hello"), Message::assistant("hi")];
        let provider = FixedProvider { fail: false };
        let (out, stats) = compressor.compress(&messages, &provider).await;
        assert_eq!(out.len(), 2);
        assert_eq!(stats.chunks_summarized, 0);
    }

    #[tokio::test]
    async fn over_threshold_folds_older_messages_and_keeps_recent_verbatim() {
        let compressor = MemoryCompressor::new();
        let messages = long_history(40);
        let provider = FixedProvider { fail: false };
        let (out, stats) = compressor.compress(&messages, &provider).await;

        assert!(stats.chunks_summarized > 0);
        let recent_tail = &out[out.len() - KEEP_RECENT_COUNT..];
        assert_eq!(
            recent_tail.last().unwrap().text,
            messages.last().unwrap().text
        );
    }

    #[tokio::test]
    async fn summarization_failure_falls_back_to_truncation() {
        let compressor = MemoryCompressor::new();
        let messages = long_history(40);
        let provider = FixedProvider { fail: true };
        let (_out, stats) = compressor.compress(&messages, &provider).await;
        assert!(stats.chunks_truncated > 0);
        assert_eq!(stats.chunks_summarized, 0);
    }
}
