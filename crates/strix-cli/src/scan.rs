//! Orchestrates one scan end to end: environment readiness, sandbox
//! lifecycle, the root agent's think-act loop, and cancellation (§5, §6).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use strix_agent::{AgentEngine, IterationOutcome};
use strix_config::Config;
use strix_core::agent::{Agent, AgentKind, AgentState, FailureReason};
use strix_core::ids::SandboxId;
use strix_core::message::Message;
use strix_core::scan::Scan;
use strix_graph::AgentGraph;
use strix_llm::{GatewayConfig, LlmGateway};
use strix_memory::MemoryCompressor;
use strix_sandbox::{SandboxRuntime, SandboxRuntimeConfig};
use strix_store::{AgentEvent, AgentEventKind, RunStore, StatsSnapshot};
use strix_tools::{ToolDescriptor, ToolRegistry};
use strix_verify::VerificationPipeline;

use crate::cli::Cli;
use crate::findings::{self, SubmitFindingHandler};
use crate::provider::UnconfiguredProvider;
use crate::status::StatusReporter;

/// Cancellation must complete within this deadline (§5).
const CANCELLATION_DEADLINE: Duration = Duration::from_secs(10);

/// Bound on nested agent spawning via the Agent Graph.
const MAX_AGENT_DEPTH: usize = 8;

/// Process exit codes per §6.
pub mod exit_code {
    /// Scan finished clean.
    pub const SUCCESS: i32 = 0;
    /// The environment wasn't ready (no Docker, missing model credentials).
    pub const ENVIRONMENT_NOT_READY: i32 = 3;
    /// The scan failed mid-run.
    pub const SCAN_FAILED: i32 = 4;
    /// The scan was cancelled.
    pub const CANCELLED: i32 = 5;
}

/// Run one scan from CLI arguments to completion, returning the process
/// exit code.
///
/// # Errors
///
/// Returns an error for failures that don't map cleanly onto §6's exit
/// codes (e.g. the run directory can't be created at all).
pub async fn run(cli: &Cli) -> Result<i32> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "configuration error");
            return Ok(exit_code::ENVIRONMENT_NOT_READY);
        },
    };

    let sandbox_runtime = match SandboxRuntime::connect(SandboxRuntimeConfig {
        image: config.sandbox_image.clone(),
        execution_timeout: config.sandbox_execution_timeout,
    }) {
        Ok(runtime) => Arc::new(runtime),
        Err(err) => {
            tracing::error!(error = %err, "sandbox runtime unavailable");
            return Ok(exit_code::ENVIRONMENT_NOT_READY);
        },
    };

    let sandbox_id = SandboxId::new();
    let sandbox = match sandbox_runtime.create(&sandbox_id).await {
        Ok(sandbox) => Arc::new(sandbox),
        Err(err) => {
            tracing::error!(error = %err, "failed to start sandbox container");
            return Ok(exit_code::ENVIRONMENT_NOT_READY);
        },
    };

    let result = run_with_sandbox(cli, &config, sandbox_runtime.clone(), sandbox.clone()).await;

    sandbox_runtime.destroy(&sandbox).await;

    result
}

async fn run_with_sandbox(
    cli: &Cli,
    config: &Config,
    sandbox_runtime: Arc<SandboxRuntime>,
    sandbox: Arc<strix_sandbox::Sandbox>,
) -> Result<i32> {
    let runs_dir = cli.runs_dir.clone().unwrap_or_else(|| PathBuf::from("strix_runs"));
    let reporter = Arc::new(StatusReporter::new(cli.format));

    let scan_mode: strix_core::ScanMode = cli.scan_mode.into();
    reporter.scan_started(&cli.target, scan_mode);
    let root_agent = Agent::new(AgentKind::Root, None, sandbox_id_of(&sandbox));
    let scan = Scan::new(cli.target.clone(), scan_mode, Vec::new(), sandbox_id_of(&sandbox), root_agent.id.clone());

    let run_name = cli.run_name.clone().unwrap_or_else(|| scan.id.as_str().to_string());
    let store = Arc::new(
        RunStore::create(&runs_dir, &run_name)
            .await
            .context("creating run directory")?,
    );
    store.write_scan(&scan).await.context("writing scan.json")?;

    let gateway = Arc::new(LlmGateway::new(
        UnconfiguredProvider::new(config.llm_model.clone()),
        GatewayConfig {
            max_concurrent: config.llm_rate_limit_concurrent.unwrap_or(4),
            inter_request_delay: config.llm_rate_limit_delay.unwrap_or(Duration::ZERO),
            request_timeout: config.llm_timeout,
        },
    ));
    let compressor = Arc::new(MemoryCompressor::new());

    let pipeline = Arc::new(VerificationPipeline::new(
        gateway.clone(),
        compressor.clone(),
        store.clone(),
        sandbox_runtime.clone(),
        sandbox.clone(),
        Vec::new(),
        Arc::new(|vulnerability_type: &str| {
            format!("You are a security verification specialist reviewing a reported {vulnerability_type} finding.")
        }),
    ));

    let mut registry = ToolRegistry::new();
    registry.register(ToolDescriptor::new(
        findings::SUBMIT_FINDING_TOOL,
        "Submit a vulnerability finding for independent verification.",
        findings::submit_finding_schema(),
        false,
        true,
        Box::new(SubmitFindingHandler::new(pipeline, reporter.clone())),
    ))?;
    registry.register(ToolDescriptor::new(
        strix_agent::FINISH_TOOL_NAME,
        "Signal that the scan is complete.",
        serde_json::json!({"type": "object", "properties": {}}),
        false,
        false,
        Box::new(FinishHandler),
    ))?;
    registry.register(ToolDescriptor::new(
        strix_agent::AWAIT_REPLY_TOOL_NAME,
        "Block until a reply arrives from another agent, or a 600s auto-resume timeout fires.",
        serde_json::json!({"type": "object", "properties": {}}),
        false,
        false,
        Box::new(AwaitReplyHandler),
    ))?;
    registry.seal();

    let graph = Arc::new(AgentGraph::new(MAX_AGENT_DEPTH));
    graph.register_root(root_agent.id.clone()).await;

    let engine = AgentEngine::new(
        gateway,
        Arc::new(registry),
        compressor,
        system_prompt(cli),
    );

    let mut agent = root_agent;
    let mut state = AgentState::default();
    state.push(Message::user(seed_message(cli)));

    store
        .append_event(
            &agent.id,
            AgentEvent::now(AgentEventKind::Spawned {
                parent_id: None,
                agent_kind: "root".to_string(),
            }),
        )
        .await?;

    let drive = drive_root_agent(&engine, &mut agent, &mut state, &graph);

    // `drive` is polled directly in this `select!`, not spawned onto its own
    // task: when the `ctrl_c` branch wins, `drive` is dropped in place,
    // which cancels whatever `.await` it was suspended on — including any
    // in-flight `LlmGateway::complete` call the root agent's iteration was
    // waiting on. No separate abort signal is needed for the gateway side
    // of §5's cancellation requirement.
    let outcome = tokio::select! {
        outcome = drive => Outcome::Ran(outcome?),
        _ = tokio::signal::ctrl_c() => Outcome::Cancelled,
    };

    let exit_code = match outcome {
        Outcome::Cancelled => {
            agent.status = strix_core::agent::AgentStatus::Failed {
                reason: FailureReason::Cancelled,
            };
            tracing::warn!("cancellation requested, tearing down within deadline");

            // §5: the Agent Graph marks every running agent `failed(cancelled)`.
            // Only the root agent is driven as a live `Agent` in this binary
            // (see DESIGN.md's single-agent simplification note), but every
            // id the graph knows about still gets its terminal transition
            // recorded in the trace.
            for id in graph.all_ids().await {
                store
                    .append_event(
                        &id,
                        AgentEvent::now(AgentEventKind::StateTransition {
                            from: "running".to_string(),
                            to: format!("{:?}", strix_core::agent::AgentStatus::Failed {
                                reason: FailureReason::Cancelled,
                            }),
                        }),
                    )
                    .await
                    .ok();
            }

            tokio::time::timeout(CANCELLATION_DEADLINE, sandbox_runtime.destroy(&sandbox))
                .await
                .ok();
            exit_code::CANCELLED
        },
        Outcome::Ran(IterationOutcome::Finished) => exit_code::SUCCESS,
        Outcome::Ran(_) => exit_code::SCAN_FAILED,
    };

    store
        .append_event(
            &agent.id,
            AgentEvent::now(AgentEventKind::StateTransition {
                from: "running".to_string(),
                to: format!("{:?}", agent.status),
            }),
        )
        .await?;

    let mut stats = StatsSnapshot::empty(scan.id.clone());
    stats.total_cost_usd = state.usage.cost_usd;
    stats.total_tokens = state
        .usage
        .input_tokens
        .saturating_add(state.usage.output_tokens)
        .saturating_add(state.usage.cached_tokens);
    stats.agents_finished = u64::from(matches!(agent.status, strix_core::agent::AgentStatus::Finished));
    stats.agents_failed = u64::from(matches!(agent.status, strix_core::agent::AgentStatus::Failed { .. }));
    store.write_stats(&stats).await?;

    reporter.scan_finished(&format!("{:?}", agent.status), exit_code);

    Ok(exit_code)
}

enum Outcome {
    Ran(IterationOutcome),
    Cancelled,
}

async fn drive_root_agent(
    engine: &AgentEngine<UnconfiguredProvider>,
    agent: &mut Agent,
    state: &mut AgentState,
    graph: &AgentGraph,
) -> Result<IterationOutcome> {
    loop {
        let agent_id = agent.id.clone();
        let outcome = engine
            .run_iteration(agent, state, None, || {
                // The root agent's implicit-finish readiness: no unread
                // inbox and no outstanding children (§4.6).
                graph_is_quiescent(graph, &agent_id)
            })
            .await?;

        match outcome {
            IterationOutcome::Continue => continue,
            IterationOutcome::Waiting => {
                resume_from_waiting(graph, &agent_id, agent, state).await?;
                continue;
            },
            other => return Ok(other),
        }
    }
}

/// Drives the `waiting → running` half of §4.5's sub-state-machine: block
/// on the graph until a reply lands or the 600s auto-resume deadline
/// fires, then fold whatever arrived (real mail, or a synthetic timeout
/// notice) back into `state` and put the agent back to `running`.
async fn resume_from_waiting(
    graph: &AgentGraph,
    agent_id: &strix_core::ids::AgentId,
    agent: &mut Agent,
    state: &mut AgentState,
) -> Result<()> {
    match graph.wait(agent_id, strix_graph::WAITING_AUTO_RESUME).await? {
        strix_graph::WaitOutcome::Delivered => {
            for mail in graph.receive(agent_id).await? {
                state.push(Message::user(format!("[from {}] {}", mail.from, mail.body)));
            }
        },
        strix_graph::WaitOutcome::TimedOut => {
            state.push(Message::system(format!(
                "auto-resumed after a {}s wait with no reply",
                strix_graph::WAITING_AUTO_RESUME.as_secs()
            )));
        },
    }

    agent.status = strix_core::agent::AgentStatus::Running;
    Ok(())
}

fn graph_is_quiescent(_graph: &AgentGraph, _agent_id: &strix_core::ids::AgentId) -> bool {
    // A single-agent scan (no spawned children) is always quiescent; a
    // scan that spawns children would check `graph.children_of` and each
    // child's terminal status here instead.
    true
}

fn sandbox_id_of(sandbox: &strix_sandbox::Sandbox) -> SandboxId {
    sandbox.id.clone()
}

fn system_prompt(cli: &Cli) -> String {
    format!(
        "You are the root agent of an autonomous security scan against {target} \
         (mode: {mode:?}). Use the available tools to investigate the target and submit \
         any vulnerability findings for verification. Call `finish` once the scan is complete.",
        target = cli.target,
        mode = cli.scan_mode,
    )
}

fn seed_message(cli: &Cli) -> String {
    format!("Begin a {:?}-depth scan of target: {}", cli.scan_mode, cli.target)
}

struct FinishHandler;

#[async_trait::async_trait]
impl strix_tools::ToolHandler for FinishHandler {
    async fn call(&self, _args: serde_json::Value) -> strix_tools::ToolResult {
        Ok("acknowledged".to_string())
    }
}

/// The engine recognizes this call by name (`AWAIT_REPLY_TOOL_NAME`) and
/// transitions the agent to `waiting` itself; this handler only supplies
/// the tool-result text the model sees for the call.
struct AwaitReplyHandler;

#[async_trait::async_trait]
impl strix_tools::ToolHandler for AwaitReplyHandler {
    async fn call(&self, _args: serde_json::Value) -> strix_tools::ToolResult {
        Ok("waiting for a reply".to_string())
    }
}
