//! Gateway discipline layered on top of a raw [`LlmProvider`]: bounded
//! concurrency, inter-request pacing, retry with backoff, and cost
//! accounting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use strix_core::message::Message;
use strix_core::retry::{RetryConfig, retry};
use tokio::sync::{Mutex, Semaphore};

use crate::cost::cost_usd;
use crate::error::GatewayError;
use crate::provider::LlmProvider;
use crate::types::{LlmResponse, LlmToolDefinition, Usage};

/// Number of plain-text messages between cache-breakpoint markers, per
/// §4.3's cost-control discipline.
const CACHE_BREAKPOINT_INTERVAL: usize = 10;

/// Gateway tuning, sourced from `LLM_RATE_LIMIT_CONCURRENT`,
/// `LLM_RATE_LIMIT_DELAY`, and `LLM_TIMEOUT` by `strix-config`.
#[derive(Debug, Clone, Copy)]
pub struct GatewayConfig {
    /// Maximum number of in-flight requests across all agents.
    pub max_concurrent: usize,
    /// Minimum delay enforced between the start of consecutive requests.
    pub inter_request_delay: Duration,
    /// Hard ceiling on a single request's wall-clock time.
    pub request_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            inter_request_delay: Duration::from_millis(0),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// A single choke point for all LLM traffic across a scan's agents.
///
/// The semaphore is a `tokio::sync::Semaphore`, which grants permits in
/// FIFO order — callers waiting on `acquire` are served in the order they
/// asked, giving the fairness §4.3 requires across concurrently-running
/// agents without a separate queue data structure.
pub struct LlmGateway<P: LlmProvider> {
    provider: P,
    config: GatewayConfig,
    semaphore: Arc<Semaphore>,
    last_request_started: Mutex<Option<Instant>>,
}

impl<P: LlmProvider> LlmGateway<P> {
    /// Wrap a provider with gateway discipline.
    #[must_use]
    pub fn new(provider: P, config: GatewayConfig) -> Self {
        Self {
            provider,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            config,
            last_request_started: Mutex::new(None),
        }
    }

    /// The model name in use, for logging and cost accounting.
    #[must_use]
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    async fn pace(&self) {
        if self.config.inter_request_delay.is_zero() {
            return;
        }
        let mut last = self.last_request_started.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.config.inter_request_delay {
                tokio::time::sleep(self.config.inter_request_delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Request the next assistant turn, with retry, pacing, and bounded
    /// concurrency applied.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Timeout`] if `request_timeout` elapses, or
    /// the provider's own error once the retry budget is exhausted.
    pub async fn complete(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
    ) -> Result<(LlmResponse, f64), GatewayError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .expect("semaphore is never closed");
        self.pace().await;

        let timeout = self.config.request_timeout;
        let result = tokio::time::timeout(
            timeout,
            retry(
                RetryConfig::llm_gateway(),
                || self.provider.complete(messages, tools, system),
                GatewayError::is_retryable,
            ),
        )
        .await;

        let response = match result {
            Ok(Ok((response, _outcome))) => response,
            Ok(Err(err)) => return Err(err),
            Err(_elapsed) => return Err(GatewayError::Timeout(timeout.as_secs())),
        };

        let cost = cost_usd(self.provider.model(), &response.usage);
        Ok((response, cost))
    }

    /// Approximate token count for a piece of text, delegated to the
    /// provider.
    #[must_use]
    pub fn count_tokens(&self, text: &str) -> usize {
        self.provider.count_tokens(text)
    }

    /// Maximum context length for the configured model.
    #[must_use]
    pub fn max_context_length(&self) -> usize {
        self.provider.max_context_length()
    }
}

/// Indices (into `messages`) that should carry a cache-breakpoint marker:
/// every [`CACHE_BREAKPOINT_INTERVAL`]th message, counting from the start of
/// the conversation. Providers that support prompt caching use this to
/// decide where to plant a `cache_control` boundary; providers that don't
/// simply ignore it.
#[must_use]
pub fn cache_breakpoints(message_count: usize) -> Vec<usize> {
    (CACHE_BREAKPOINT_INTERVAL..=message_count)
        .step_by(CACHE_BREAKPOINT_INTERVAL)
        .map(|n| n - 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use strix_core::message::ToolCall;

    use super::*;
    use crate::provider::StreamBox;
    use crate::types::{LlmResponse, StopReason};

    struct CountingProvider {
        calls: AtomicUsize,
        fail_first: usize,
    }

    #[async_trait]
    impl LlmProvider for CountingProvider {
        fn name(&self) -> &str {
            "test"
        }

        fn model(&self) -> &str {
            "claude-sonnet-test"
        }

        async fn stream(
            &self,
            _messages: &[Message],
            _tools: &[LlmToolDefinition],
            _system: &str,
        ) -> Result<StreamBox, GatewayError> {
            unimplemented!("not exercised in these tests")
        }

        async fn complete(
            &self,
            _messages: &[Message],
            _tools: &[LlmToolDefinition],
            _system: &str,
        ) -> Result<LlmResponse, GatewayError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                return Err(GatewayError::RateLimited("slow down".into()));
            }
            Ok(LlmResponse {
                text: Some("done".into()),
                tool_calls: Vec::<ToolCall>::new(),
                stop_reason: StopReason::EndTurn,
                usage: Usage {
                    input_tokens: 100,
                    output_tokens: 50,
                    cached_tokens: 0,
                },
            })
        }

        fn max_context_length(&self) -> usize {
            200_000
        }
    }

    #[tokio::test]
    async fn retries_then_succeeds_and_prices_the_call() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
            fail_first: 2,
        };
        let gateway = LlmGateway::new(
            provider,
            GatewayConfig {
                max_concurrent: 2,
                inter_request_delay: Duration::from_millis(0),
                request_timeout: Duration::from_secs(5),
            },
        );

        let (response, cost) = gateway.complete(&[], &[], "").await.unwrap();
        assert_eq!(response.text.as_deref(), Some("done"));
        assert!(cost > 0.0);
    }

    #[test]
    fn cache_breakpoints_every_ten_messages() {
        assert_eq!(cache_breakpoints(25), vec![9, 19]);
        assert_eq!(cache_breakpoints(9), Vec::<usize>::new());
    }
}
