//! The per-agent think-act loop (§4.5).

use std::sync::Arc;

use strix_core::agent::{Agent, AgentState, AgentStatus, FailureReason};
use strix_core::ids::AgentId;
use strix_core::message::Message;
use strix_llm::{LlmGateway, LlmProvider};
use strix_memory::MemoryCompressor;
use strix_tools::ToolRegistry;

use crate::dispatch::{self, SandboxContext};
use crate::error::EngineError;
use crate::{AWAIT_REPLY_TOOL_NAME, FINISH_TOOL_NAME};

/// Result of running one iteration of an agent's loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationOutcome {
    /// Tool calls were dispatched; call `run_iteration` again.
    Continue,
    /// The agent reached `finished` this iteration.
    Finished,
    /// The agent called `await_reply`: now `waiting`. The caller owns the
    /// Agent Graph and must drive the actual wait (§4.5), then resume the
    /// loop with the delivered mail, or a synthetic timeout message, folded
    /// into `state` and `agent.status` reset to `running`.
    Waiting,
    /// Two consecutive no-tool-call iterations: the agent is now
    /// `failed(stuck)`.
    Stuck,
    /// The agent's iteration budget is exhausted: now `failed(exhausted)`.
    Exhausted,
}

/// Bound on concurrent dispatch within one parallel tool-call batch.
const MAX_PARALLEL_FANOUT: usize = 8;

/// One engine instance per agent: owns no per-agent state itself (that
/// lives in [`AgentState`]/[`Agent`]) so the same engine can drive many
/// agents concurrently, matching §5's "different agents run concurrently"
/// model.
pub struct AgentEngine<P: LlmProvider> {
    gateway: Arc<LlmGateway<P>>,
    tools: Arc<ToolRegistry>,
    compressor: Arc<MemoryCompressor>,
    system_prompt: String,
}

impl<P: LlmProvider> AgentEngine<P> {
    /// Build an engine over a shared gateway, tool registry, and
    /// compressor.
    #[must_use]
    pub fn new(
        gateway: Arc<LlmGateway<P>>,
        tools: Arc<ToolRegistry>,
        compressor: Arc<MemoryCompressor>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            tools,
            compressor,
            system_prompt: system_prompt.into(),
        }
    }

    /// Run one iteration of the think-act loop for `agent`, mutating
    /// `state` and `agent` in place.
    ///
    /// `is_terminal_ready` decides, when the model returns no tool calls,
    /// whether that counts as an implicit `finish` (the agent has nothing
    /// left to wait on — no unread inbox, no pending children) or should be
    /// re-prompted. This is supplied by the caller (the Agent Graph) rather
    /// than decided here, since the engine has no visibility into mailbox
    /// or child state.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::LlmFatal`] if the gateway exhausts its retry
    /// budget.
    pub async fn run_iteration(
        &self,
        agent: &mut Agent,
        state: &mut AgentState,
        sandbox: Option<&SandboxContext<'_>>,
        is_terminal_ready: impl FnOnce() -> bool,
    ) -> Result<IterationOutcome, EngineError> {
        if agent.is_exhausted() {
            agent.status = AgentStatus::Failed {
                reason: FailureReason::Exhausted,
            };
            return Ok(IterationOutcome::Exhausted);
        }

        let (compressed, _stats) = self.compressor.compress(&state.messages, &self.gateway_provider()).await;
        let tool_defs = self.tools.all_tool_definitions();

        let (response, cost) = match self
            .gateway
            .complete(&compressed, &tool_defs, &self.system_prompt)
            .await
        {
            Ok(ok) => ok,
            Err(err) => {
                agent.status = AgentStatus::Failed {
                    reason: FailureReason::GatewayFatal,
                };
                state.last_error = Some(err.to_string());
                return Err(err.into());
            },
        };

        state.usage.record(
            response.usage.input_tokens as u64,
            response.usage.output_tokens as u64,
            response.usage.cached_tokens as u64,
            cost,
        );

        agent.iteration = agent.iteration.saturating_add(1);

        if response.tool_calls.is_empty() {
            if is_terminal_ready() {
                state.push(Message::assistant(response.text.unwrap_or_default()));
                agent.status = AgentStatus::Finished;
                return Ok(IterationOutcome::Finished);
            }

            agent.consecutive_empty_iterations = agent.consecutive_empty_iterations.saturating_add(1);
            if let Some(text) = response.text {
                state.push(Message::assistant(text));
            }

            if agent.consecutive_empty_iterations >= 2 {
                agent.status = AgentStatus::Failed {
                    reason: FailureReason::Stuck,
                };
                return Ok(IterationOutcome::Stuck);
            }

            state.push(Message::user(
                "Continue working toward a conclusion, or call a tool.",
            ));
            return Ok(IterationOutcome::Continue);
        }

        agent.consecutive_empty_iterations = 0;

        let mut tool_calls = response.tool_calls;
        state.push(Message::assistant_with_tools(response.text, tool_calls.clone()));

        let partition = self.tools.partition(&tool_calls);
        let explicit_finish = tool_calls.iter().any(|c| c.name == FINISH_TOOL_NAME);
        let explicit_wait = tool_calls.iter().any(|c| c.name == AWAIT_REPLY_TOOL_NAME);
        let parallel_ids: Vec<_> = partition.parallel.iter().map(|c| c.id.clone()).collect();
        let run_parallel = !parallel_ids.is_empty();

        if run_parallel {
            let results = self.dispatch_parallel(&mut tool_calls, &parallel_ids, sandbox, &agent.id).await;
            for message in results {
                state.push(message);
            }
        } else {
            for call in &mut tool_calls {
                let message = dispatch::dispatch(&self.tools, sandbox, &agent.id, call).await;
                state.push(message);
            }
        }

        state.record_action(format!("tool_calls:{}", tool_calls.len()));

        if explicit_finish {
            if is_terminal_ready() {
                agent.status = AgentStatus::Finished;
                return Ok(IterationOutcome::Finished);
            }

            // §4.5/§8: finish is refused while mail is unread; the tool
            // result already appended above stands, and the agent is
            // re-prompted rather than transitioned.
            state.push(Message::user(
                "finish was refused: unread messages are still pending. Drain them, then finish again.",
            ));
            return Ok(IterationOutcome::Continue);
        }

        if explicit_wait {
            agent.status = AgentStatus::Waiting;
            return Ok(IterationOutcome::Waiting);
        }

        Ok(IterationOutcome::Continue)
    }

    async fn dispatch_parallel(
        &self,
        tool_calls: &mut [strix_core::message::ToolCall],
        ids_in_order: &[strix_core::ids::ToolCallId],
        sandbox: Option<&SandboxContext<'_>>,
        agent_id: &AgentId,
    ) -> Vec<Message> {
        use futures::stream::{self, StreamExt};

        let indices: Vec<usize> = ids_in_order
            .iter()
            .map(|id| tool_calls.iter().position(|c| &c.id == id).expect("id present"))
            .collect();

        // Take ownership of each call by value so futures can run without
        // borrowing `tool_calls` across an await point; write results back
        // into the original slice afterward, preserving request order.
        let mut owned: Vec<_> = indices
            .iter()
            .map(|&i| std::mem::replace(&mut tool_calls[i], strix_core::message::ToolCall::new("", serde_json::Value::Null)))
            .collect();

        let tools = &self.tools;
        let results: Vec<(strix_core::message::ToolCall, Message)> = stream::iter(owned.drain(..))
            .map(|mut call| async move {
                let message = dispatch::dispatch(tools, sandbox, agent_id, &mut call).await;
                (call, message)
            })
            .buffered(MAX_PARALLEL_FANOUT)
            .collect()
            .await;

        let mut messages = Vec::with_capacity(results.len());
        for (i, (call, message)) in indices.into_iter().zip(results.into_iter()) {
            tool_calls[i] = call;
            messages.push(message);
        }
        messages
    }

    fn gateway_provider(&self) -> GatewayProviderRef<'_, P> {
        GatewayProviderRef(self)
    }
}

/// Adapts `&AgentEngine` to the [`LlmProvider`] surface the compressor
/// needs for its summarization calls, routing them back through the same
/// gateway (so summarization requests are rate-limited and retried
/// identically to ordinary turns).
struct GatewayProviderRef<'a, P: LlmProvider>(&'a AgentEngine<P>);

#[async_trait::async_trait]
impl<'a, P: LlmProvider> LlmProvider for GatewayProviderRef<'a, P> {
    fn name(&self) -> &str {
        "gateway"
    }

    fn model(&self) -> &str {
        self.0.gateway.model()
    }

    async fn stream(
        &self,
        _messages: &[Message],
        _tools: &[strix_llm::LlmToolDefinition],
        _system: &str,
    ) -> Result<strix_llm::StreamBox, strix_llm::GatewayError> {
        Err(strix_llm::GatewayError::Fatal(
            "streaming not used for summarization".into(),
        ))
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[strix_llm::LlmToolDefinition],
        system: &str,
    ) -> Result<strix_llm::LlmResponse, strix_llm::GatewayError> {
        self.0.gateway.complete(messages, tools, system).await.map(|(r, _)| r)
    }

    fn count_tokens(&self, text: &str) -> usize {
        self.0.gateway.count_tokens(text)
    }

    fn max_context_length(&self) -> usize {
        self.0.gateway.max_context_length()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;
    use strix_core::agent::{AgentKind, AgentStatus};
    use strix_core::ids::SandboxId;
    use strix_llm::provider::StreamBox;
    use strix_llm::types::{LlmResponse, StopReason, Usage};
    use strix_llm::{GatewayConfig, LlmToolDefinition};
    use strix_tools::{ToolDescriptor, ToolError, ToolHandler};

    use super::*;

    struct ScriptedProvider {
        responses: std::sync::Mutex<Vec<LlmResponse>>,
    }

    #[async_trait::async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }
        fn model(&self) -> &str {
            "claude-sonnet-test"
        }
        async fn stream(
            &self,
            _messages: &[Message],
            _tools: &[LlmToolDefinition],
            _system: &str,
        ) -> Result<StreamBox, strix_llm::GatewayError> {
            unimplemented!("not exercised")
        }
        async fn complete(
            &self,
            _messages: &[Message],
            _tools: &[LlmToolDefinition],
            _system: &str,
        ) -> Result<LlmResponse, strix_llm::GatewayError> {
            let mut responses = self.responses.lock().unwrap();
            Ok(responses.remove(0))
        }
        fn max_context_length(&self) -> usize {
            200_000
        }
    }

    struct Echo;

    #[async_trait::async_trait]
    impl ToolHandler for Echo {
        async fn call(&self, args: serde_json::Value) -> Result<String, ToolError> {
            Ok(args.to_string())
        }
    }

    fn echo_tool(name: &str, parallelizable: bool) -> ToolDescriptor {
        ToolDescriptor::new(name, "echoes its args", json!({"type": "object"}), false, parallelizable, Box::new(Echo))
    }

    fn response_with_calls(calls: Vec<(&str, serde_json::Value)>) -> LlmResponse {
        LlmResponse {
            text: None,
            tool_calls: calls
                .into_iter()
                .map(|(name, args)| strix_core::message::ToolCall::new(name, args))
                .collect(),
            stop_reason: StopReason::ToolUse,
            usage: Usage {
                input_tokens: 10,
                output_tokens: 5,
                cached_tokens: 0,
            },
        }
    }

    fn text_response(text: &str) -> LlmResponse {
        LlmResponse {
            text: Some(text.into()),
            tool_calls: Vec::new(),
            stop_reason: StopReason::EndTurn,
            usage: Usage {
                input_tokens: 10,
                output_tokens: 5,
                cached_tokens: 0,
            },
        }
    }

    fn engine_with(provider: ScriptedProvider, tools: ToolRegistry) -> AgentEngine<ScriptedProvider> {
        AgentEngine::new(
            Arc::new(LlmGateway::new(provider, GatewayConfig::default())),
            Arc::new(tools),
            Arc::new(MemoryCompressor::new()),
            "you are a test agent",
        )
    }

    #[tokio::test]
    async fn dispatches_a_tool_call_and_continues() {
        let provider = ScriptedProvider {
            responses: std::sync::Mutex::new(vec![response_with_calls(vec![("echo", json!({"x": 1}))])]),
        };
        let mut tools = ToolRegistry::new();
        tools.register(echo_tool("echo", true)).unwrap();
        let engine = engine_with(provider, tools);

        let mut agent = Agent::new(AgentKind::Root, None, SandboxId::new());
        let mut state = AgentState::default();
        state.push(Message::user("go"));

        let outcome = engine.run_iteration(&mut agent, &mut state, None, || false).await.unwrap();
        assert_eq!(outcome, IterationOutcome::Continue);
        assert_eq!(agent.consecutive_empty_iterations, 0);
        assert!(state.messages.iter().any(|m| m.tool_call_id.is_some()));
    }

    #[tokio::test]
    async fn no_tool_calls_and_terminal_ready_finishes() {
        let provider = ScriptedProvider {
            responses: std::sync::Mutex::new(vec![text_response("all done")]),
        };
        let engine = engine_with(provider, ToolRegistry::new());

        let mut agent = Agent::new(AgentKind::Root, None, SandboxId::new());
        let mut state = AgentState::default();

        let outcome = engine.run_iteration(&mut agent, &mut state, None, || true).await.unwrap();
        assert_eq!(outcome, IterationOutcome::Finished);
        assert_eq!(agent.status, AgentStatus::Finished);
    }

    #[tokio::test]
    async fn explicit_finish_is_refused_without_terminal_readiness() {
        let provider = ScriptedProvider {
            responses: std::sync::Mutex::new(vec![response_with_calls(vec![(FINISH_TOOL_NAME, json!({}))])]),
        };
        let engine = engine_with(provider, ToolRegistry::new());

        let mut agent = Agent::new(AgentKind::Root, None, SandboxId::new());
        let mut state = AgentState::default();

        let outcome = engine.run_iteration(&mut agent, &mut state, None, || false).await.unwrap();
        assert_eq!(outcome, IterationOutcome::Continue);
        assert_eq!(agent.status, AgentStatus::Running);
    }

    #[tokio::test]
    async fn explicit_finish_succeeds_when_terminal_ready() {
        let provider = ScriptedProvider {
            responses: std::sync::Mutex::new(vec![response_with_calls(vec![(FINISH_TOOL_NAME, json!({}))])]),
        };
        let engine = engine_with(provider, ToolRegistry::new());

        let mut agent = Agent::new(AgentKind::Root, None, SandboxId::new());
        let mut state = AgentState::default();

        let outcome = engine.run_iteration(&mut agent, &mut state, None, || true).await.unwrap();
        assert_eq!(outcome, IterationOutcome::Finished);
        assert_eq!(agent.status, AgentStatus::Finished);
    }

    #[tokio::test]
    async fn explicit_await_reply_transitions_to_waiting() {
        let provider = ScriptedProvider {
            responses: std::sync::Mutex::new(vec![response_with_calls(vec![(AWAIT_REPLY_TOOL_NAME, json!({}))])]),
        };
        let engine = engine_with(provider, ToolRegistry::new());

        let mut agent = Agent::new(AgentKind::Root, None, SandboxId::new());
        let mut state = AgentState::default();

        let outcome = engine.run_iteration(&mut agent, &mut state, None, || false).await.unwrap();
        assert_eq!(outcome, IterationOutcome::Waiting);
        assert_eq!(agent.status, AgentStatus::Waiting);
    }

    #[tokio::test]
    async fn two_empty_iterations_without_terminal_readiness_goes_stuck() {
        let provider = ScriptedProvider {
            responses: std::sync::Mutex::new(vec![text_response("thinking"), text_response("still thinking")]),
        };
        let engine = engine_with(provider, ToolRegistry::new());

        let mut agent = Agent::new(AgentKind::Root, None, SandboxId::new());
        let mut state = AgentState::default();

        let first = engine.run_iteration(&mut agent, &mut state, None, || false).await.unwrap();
        assert_eq!(first, IterationOutcome::Continue);
        let second = engine.run_iteration(&mut agent, &mut state, None, || false).await.unwrap();
        assert_eq!(second, IterationOutcome::Stuck);
        assert!(matches!(
            agent.status,
            AgentStatus::Failed {
                reason: strix_core::agent::FailureReason::Stuck
            }
        ));
    }

    #[tokio::test]
    async fn exhausted_budget_short_circuits_without_a_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        struct CountingProvider(Arc<AtomicUsize>);
        #[async_trait::async_trait]
        impl LlmProvider for CountingProvider {
            fn name(&self) -> &str {
                "counting"
            }
            fn model(&self) -> &str {
                "claude-sonnet-test"
            }
            async fn stream(
                &self,
                _messages: &[Message],
                _tools: &[LlmToolDefinition],
                _system: &str,
            ) -> Result<StreamBox, strix_llm::GatewayError> {
                unimplemented!()
            }
            async fn complete(
                &self,
                _messages: &[Message],
                _tools: &[LlmToolDefinition],
                _system: &str,
            ) -> Result<LlmResponse, strix_llm::GatewayError> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(text_response("unused"))
            }
            fn max_context_length(&self) -> usize {
                200_000
            }
        }

        let engine = engine_with_counting(CountingProvider(calls.clone()), ToolRegistry::new());
        let mut agent = Agent::new(AgentKind::Verifier, None, SandboxId::new());
        agent.iteration = agent.iteration_limit;
        let mut state = AgentState::default();

        let outcome = engine.run_iteration(&mut agent, &mut state, None, || false).await.unwrap();
        assert_eq!(outcome, IterationOutcome::Exhausted);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    fn engine_with_counting(
        provider: impl LlmProvider + 'static,
        tools: ToolRegistry,
    ) -> AgentEngine<impl LlmProvider> {
        AgentEngine::new(
            Arc::new(LlmGateway::new(provider, GatewayConfig::default())),
            Arc::new(tools),
            Arc::new(MemoryCompressor::new()),
            "you are a test agent",
        )
    }
}
