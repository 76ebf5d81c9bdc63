//! The Verification Pipeline itself (§4.7): spawns one verifier agent per
//! submitted finding, drives it through the two-phase protocol, and
//! finalises the finding in the Run Store.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use strix_agent::{AgentEngine, FINISH_TOOL_NAME, IterationOutcome, SandboxContext};
use strix_core::agent::{Agent, AgentKind, AgentState};
use strix_core::finding::{FindingReport, FindingStatus, RejectionReason};
use strix_core::ids::{AgentId, WorkerId};
use strix_core::message::Message;
use strix_llm::{LlmGateway, LlmProvider};
use strix_memory::MemoryCompressor;
use strix_sandbox::{Sandbox, SandboxRuntime};
use strix_store::{AgentEvent, AgentEventKind, RunStore};
use strix_tools::{ToolDescriptor, ToolError, ToolHandler, ToolRegistry, ToolResult};

use crate::error::{VerificationError, VerificationResult};
use crate::session::VerificationSession;
use crate::tools::{
    REPORT_CONTROL_TEST_TOOL, REPORT_REPRODUCTION_TOOL, ReportControlTestTool, ReportReproductionTool,
    control_test_schema, reproduction_schema,
};

/// Bound on how many times a verifier is re-spawned for one finding after
/// a crash or a run that ended without a verdict, before the finding is
/// rejected outright (§9: "the pipeline survives verifier crashes by
/// re-spawning" — bounded so a persistently broken verifier can't stall a
/// finding forever).
const MAX_VERIFIER_SPAWNS: usize = 3;

/// Declarative description of one reproduction tool the verifier may call.
/// Mirrors [`ToolDescriptor`] minus the handler: sandboxed calls are routed
/// through [`strix_agent::dispatch`]'s `SandboxContext` before the
/// descriptor's own handler is ever consulted, so a placeholder suffices
/// here (bodies — browser, HTTP replay, shell — are supplied by whatever
/// embeds this crate, same as the originating scan's own tool set).
#[derive(Debug, Clone)]
pub struct VerifierToolSpec {
    /// Tool name, matching the originating scan's registry.
    pub name: String,
    /// Tool description, surfaced in the LLM's tool spec.
    pub description: String,
    /// JSON schema for the tool's arguments.
    pub input_schema: Value,
    /// Whether this tool may run concurrently with others in the same
    /// batch.
    pub parallelizable: bool,
}

/// A tool descriptor whose `runs_in_sandbox` flag is `true`; its own
/// `call` is never reached — it exists only to satisfy
/// `ToolDescriptor::handler`'s type.
struct SandboxRoutedHandler;

#[async_trait::async_trait]
impl ToolHandler for SandboxRoutedHandler {
    async fn call(&self, _args: Value) -> ToolResult {
        Err(ToolError::Other(
            "sandbox-routed tool invoked without a sandbox context".to_string(),
        ))
    }
}

/// Handler for the reserved `finish` tool: a bare acknowledgement, since
/// the engine itself detects the call by name and transitions the agent.
struct AckHandler;

#[async_trait::async_trait]
impl ToolHandler for AckHandler {
    async fn call(&self, _args: Value) -> ToolResult {
        Ok("acknowledged".to_string())
    }
}

/// Builds a verifier's system prompt from a `verification_types/<vuln>`
/// prompt module given its vulnerability type. The module library itself
/// is out of scope; this is the seam an embedder supplies it through.
pub type PromptModuleLoader = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Adjudicates submitted finding reports, one verifier agent at a time per
/// finding, in parallel across findings.
pub struct VerificationPipeline<P: LlmProvider> {
    gateway: Arc<LlmGateway<P>>,
    compressor: Arc<MemoryCompressor>,
    store: Arc<RunStore>,
    sandbox_runtime: Arc<SandboxRuntime>,
    sandbox: Arc<Sandbox>,
    reproduction_tools: Vec<VerifierToolSpec>,
    prompt_module: PromptModuleLoader,
}

impl<P: LlmProvider> VerificationPipeline<P> {
    /// Build a pipeline over the scan's shared gateway, store, and sandbox
    /// family (§4.7: "sharing the same sandbox family as the originating
    /// scan").
    #[must_use]
    pub fn new(
        gateway: Arc<LlmGateway<P>>,
        compressor: Arc<MemoryCompressor>,
        store: Arc<RunStore>,
        sandbox_runtime: Arc<SandboxRuntime>,
        sandbox: Arc<Sandbox>,
        reproduction_tools: Vec<VerifierToolSpec>,
        prompt_module: PromptModuleLoader,
    ) -> Self {
        Self {
            gateway,
            compressor,
            store,
            sandbox_runtime,
            sandbox,
            reproduction_tools,
            prompt_module,
        }
    }

    /// Adjudicate one finding: persist it as `pending`, drive verifier
    /// agents against it until a verdict is reached (re-spawning on crash,
    /// up to [`MAX_VERIFIER_SPAWNS`]), then finalise it into `verified` or
    /// `rejected`.
    ///
    /// Idempotent: resubmitting an already-adjudicated finding is a no-op
    /// (§4.7).
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError::Store`] if the run store can't be
    /// written to.
    pub async fn adjudicate(&self, mut finding: FindingReport) -> VerificationResult<FindingReport> {
        if finding.is_adjudicated() {
            return Ok(finding);
        }

        self.store.submit_finding(&finding).await?;

        let session = Arc::new(Mutex::new(VerificationSession::new()));
        let mut verdict = None;

        for attempt in 0..MAX_VERIFIER_SPAWNS {
            if verdict.is_some() {
                break;
            }

            match self.run_one_verifier(&finding, &session).await {
                Ok((agent_id, Some(v))) => {
                    finding.verifier_agent_id = Some(agent_id);
                    verdict = Some(v);
                },
                Ok((agent_id, None)) => {
                    finding.verifier_agent_id = Some(agent_id);
                    tracing::warn!(
                        finding = %finding.id,
                        attempt,
                        "verifier made no progress toward a verdict, re-spawning"
                    );
                },
                Err(err) => {
                    tracing::warn!(finding = %finding.id, attempt, error = %err, "verifier crashed, re-spawning");
                },
            }
        }

        finding.status = match verdict {
            Some(Ok(())) => FindingStatus::Verified,
            Some(Err(reason)) => FindingStatus::Rejected { reason },
            None => FindingStatus::Rejected {
                reason: RejectionReason::VerifierExhausted,
            },
        };

        self.store.finalize_finding(&finding).await?;
        Ok(finding)
    }

    /// Run a single verifier agent against `finding`, sharing `session`
    /// across re-spawns so accumulated phase state survives a crash.
    /// Returns the spawned agent's ID and its verdict, or `None` if the
    /// agent ran to completion (finished/stuck/exhausted) without settling
    /// one.
    async fn run_one_verifier(
        &self,
        finding: &FindingReport,
        session: &Arc<Mutex<VerificationSession>>,
    ) -> VerificationResult<(AgentId, Option<Result<(), RejectionReason>>)> {
        let mut agent = Agent::new(AgentKind::Verifier, None, self.sandbox.id.clone());

        let worker_id = self
            .sandbox_runtime
            .register_agent(&self.sandbox, &agent.id)
            .await
            .map_err(|source| VerificationError::SandboxUnavailable {
                finding: finding.id.clone(),
                source,
            })?;
        agent.worker_id = Some(WorkerId::from_string(worker_id));

        self.store
            .append_event(
                &agent.id,
                AgentEvent::now(AgentEventKind::Spawned {
                    parent_id: None,
                    agent_kind: "verifier".to_string(),
                }),
            )
            .await?;

        let registry = self.build_registry(session.clone())?;
        let system_prompt = self.build_system_prompt(finding);
        let engine = AgentEngine::new(
            self.gateway.clone(),
            Arc::new(registry),
            self.compressor.clone(),
            system_prompt,
        );

        let mut state = AgentState::default();
        state.push(Message::user(self.seed_message(finding)));

        let sandbox_ctx = SandboxContext {
            runtime: &self.sandbox_runtime,
            sandbox: &self.sandbox,
        };

        loop {
            let outcome = engine
                .run_iteration(&mut agent, &mut state, Some(&sandbox_ctx), || {
                    session.lock().expect("verification session poisoned").verdict().is_some()
                })
                .await
                .map_err(|source| VerificationError::EngineFailed {
                    finding: finding.id.clone(),
                    source,
                })?;

            if !matches!(outcome, IterationOutcome::Continue) {
                break;
            }
        }

        self.store
            .append_event(
                &agent.id,
                AgentEvent::now(AgentEventKind::StateTransition {
                    from: "running".to_string(),
                    to: format!("{:?}", agent.status),
                }),
            )
            .await?;

        let verdict = session.lock().expect("verification session poisoned").verdict();
        Ok((agent.id, verdict))
    }

    fn build_registry(&self, session: Arc<Mutex<VerificationSession>>) -> VerificationResult<ToolRegistry> {
        let mut registry = ToolRegistry::new();

        for spec in &self.reproduction_tools {
            registry.register(ToolDescriptor::new(
                spec.name.clone(),
                spec.description.clone(),
                spec.input_schema.clone(),
                true,
                spec.parallelizable,
                Box::new(SandboxRoutedHandler),
            ))?;
        }

        registry.register(ToolDescriptor::new(
            REPORT_REPRODUCTION_TOOL,
            "Report the outcome of one reproducibility attempt for the finding under review.",
            reproduction_schema(),
            false,
            false,
            Box::new(ReportReproductionTool::new(session.clone())),
        ))?;

        registry.register(ToolDescriptor::new(
            REPORT_CONTROL_TEST_TOOL,
            "Report the outcome of the control test designed to validate the finding.",
            control_test_schema(),
            false,
            false,
            Box::new(ReportControlTestTool::new(session)),
        ))?;

        registry.register(ToolDescriptor::new(
            FINISH_TOOL_NAME,
            "Signal that verification is complete.",
            serde_json::json!({"type": "object", "properties": {}}),
            false,
            false,
            Box::new(AckHandler),
        ))?;

        registry.seal();
        Ok(registry)
    }

    fn build_system_prompt(&self, finding: &FindingReport) -> String {
        let module = (self.prompt_module)(&finding.vulnerability_type);
        format!(
            "{module}\n\nYou are verifying a reported {vuln_type} finding. Reproduce it at \
             least three times in a row using {report_tool}, then design and run a control \
             test using {control_tool} before calling {finish}.",
            vuln_type = finding.vulnerability_type,
            report_tool = REPORT_REPRODUCTION_TOOL,
            control_tool = REPORT_CONTROL_TEST_TOOL,
            finish = FINISH_TOOL_NAME,
        )
    }

    fn seed_message(&self, finding: &FindingReport) -> String {
        let mut lines = vec![
            format!("Claim: {}", finding.claim_assertion),
            format!("Target URL: {}", finding.target_url),
            format!("Proof-of-concept payload: {}", finding.poc_payload),
        ];
        if let Some(param) = &finding.affected_parameter {
            lines.push(format!("Affected parameter: {param}"));
        }
        if !finding.reproduction_steps.is_empty() {
            lines.push("Reported reproduction steps:".to_string());
            for (i, step) in finding.reproduction_steps.iter().enumerate() {
                lines.push(format!("  {}. {step}", i + 1));
            }
        }
        if !finding.primary_evidence.is_empty() {
            lines.push("Primary evidence:".to_string());
            for item in &finding.primary_evidence {
                lines.push(format!("  - {item}"));
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ack_handler_acks() {
        let handler = AckHandler;
        let result = handler.call(serde_json::json!({})).await;
        assert_eq!(result.unwrap(), "acknowledged");
    }
}
