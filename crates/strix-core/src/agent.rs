//! Agent, AgentState, and the status state machine.
//!
//! Grounded in the shape of `astrid_runtime::subagent::{SubAgentId,
//! SubAgentStatus}` and `AgentSession`, generalised into the exact state
//! machine §4.5 of the specification describes (`running` / `waiting` /
//! `finished` / `failed`, plus the `stuck` / `exhausted` terminal-failure
//! reasons the teacher's iteration-budget handling doesn't need but the
//! scan engine does).

use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, SandboxId, WorkerId};
use crate::message::Message;

/// Default iteration budget for root and child agents.
pub const DEFAULT_ITERATION_LIMIT: usize = 300;
/// Default iteration budget for verification agents.
pub const VERIFIER_ITERATION_LIMIT: usize = 50;

/// What role an agent plays in the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// The scan's single root agent.
    Root,
    /// A sub-agent spawned via the Agent Graph.
    Child,
    /// A verifier spawned by the Verification Pipeline for one finding.
    Verifier,
}

impl AgentKind {
    /// Default iteration limit for this kind, per §3.
    #[must_use]
    pub fn default_iteration_limit(self) -> usize {
        match self {
            Self::Root | Self::Child => DEFAULT_ITERATION_LIMIT,
            Self::Verifier => VERIFIER_ITERATION_LIMIT,
        }
    }
}

/// Reason an agent terminated without reaching `finished` normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Two consecutive iterations produced no tool calls.
    Stuck,
    /// The agent hit its iteration limit.
    Exhausted,
    /// A fatal gateway error exhausted retries.
    GatewayFatal,
    /// The scan was cancelled.
    Cancelled,
}

/// Current lifecycle status of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AgentStatus {
    /// Actively looping.
    Running,
    /// Blocked on a reply via the Agent Graph.
    Waiting,
    /// Reached `finish` with an empty inbox.
    Finished,
    /// Terminated abnormally.
    Failed {
        /// Why the agent failed.
        reason: FailureReason,
    },
}

impl AgentStatus {
    /// Whether this status is terminal (no further transitions).
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed { .. })
    }
}

/// Running token/cost/request counters for an agent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UsageCounters {
    /// Prompt tokens consumed.
    pub input_tokens: u64,
    /// Completion tokens produced.
    pub output_tokens: u64,
    /// Tokens served from a provider cache.
    pub cached_tokens: u64,
    /// Cumulative cost estimate in USD.
    pub cost_usd: f64,
    /// Successful gateway requests.
    pub requests: u64,
    /// Failed gateway requests (before retry exhaustion).
    pub failed_requests: u64,
}

impl UsageCounters {
    /// Record one gateway response.
    pub fn record(&mut self, input_tokens: u64, output_tokens: u64, cached_tokens: u64, cost_usd: f64) {
        self.input_tokens = self.input_tokens.saturating_add(input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(output_tokens);
        self.cached_tokens = self.cached_tokens.saturating_add(cached_tokens);
        self.cost_usd += cost_usd;
        self.requests = self.requests.saturating_add(1);
    }

    /// Record a failed request (still retried inside the gateway).
    pub fn record_failure(&mut self) {
        self.failed_requests = self.failed_requests.saturating_add(1);
    }
}

/// An action the agent took, kept for the Run Store's event stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentAction {
    /// Human-readable description (e.g. `"tool_call:read_file"`).
    pub description: String,
    /// When the action was recorded.
    pub at: crate::timestamp::Timestamp,
}

/// The mutable conversation state owned by one Agent Engine instance.
///
/// Only the owning engine loop mutates this — §5's single-threaded-per-agent
/// rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentState {
    /// Ordered message history.
    pub messages: Vec<Message>,
    /// Usage counters.
    pub usage: UsageCounters,
    /// Actions taken, in order.
    pub actions: Vec<AgentAction>,
    /// The last error observed, if any (for diagnostics, not control flow).
    pub last_error: Option<String>,
}

impl AgentState {
    /// Append a message to the state.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Record an action for the trace.
    pub fn record_action(&mut self, description: impl Into<String>) {
        self.actions.push(AgentAction {
            description: description.into(),
            at: crate::timestamp::Timestamp::now(),
        });
    }

    /// Total approximate token count across all messages (cheap upper bound
    /// used by the memory compressor before a real count is available).
    #[must_use]
    pub fn approx_token_count(&self) -> usize {
        self.messages.iter().map(Message::approx_tokens).sum()
    }
}

/// An agent instance: identity, lineage, and lifecycle status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Unique agent ID.
    pub id: AgentId,
    /// What kind of agent this is.
    pub kind: AgentKind,
    /// Parent agent, if this is a child or verifier.
    pub parent_id: Option<AgentId>,
    /// Current lifecycle status.
    pub status: AgentStatus,
    /// Iterations consumed so far.
    pub iteration: usize,
    /// Iteration budget (fixed at creation per §3).
    pub iteration_limit: usize,
    /// Sandbox this agent's worker runs in.
    pub sandbox_id: SandboxId,
    /// In-container worker assigned to this agent, once registered.
    pub worker_id: Option<WorkerId>,
    /// Consecutive iterations that produced no tool calls and weren't an
    /// implicit finish. Two in a row transitions the agent to
    /// `failed(stuck)` (§4.5).
    pub consecutive_empty_iterations: usize,
}

impl Agent {
    /// Create a new agent of the given kind.
    #[must_use]
    pub fn new(kind: AgentKind, parent_id: Option<AgentId>, sandbox_id: SandboxId) -> Self {
        Self {
            id: AgentId::new(),
            kind,
            parent_id,
            status: AgentStatus::Running,
            iteration: 0,
            iteration_limit: kind.default_iteration_limit(),
            sandbox_id,
            worker_id: None,
            consecutive_empty_iterations: 0,
        }
    }

    /// Whether the agent has exhausted its iteration budget.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.iteration >= self.iteration_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_limits_match_kind() {
        assert_eq!(AgentKind::Root.default_iteration_limit(), 300);
        assert_eq!(AgentKind::Child.default_iteration_limit(), 300);
        assert_eq!(AgentKind::Verifier.default_iteration_limit(), 50);
    }

    #[test]
    fn terminal_statuses() {
        assert!(AgentStatus::Finished.is_terminal());
        assert!(
            AgentStatus::Failed {
                reason: FailureReason::Stuck
            }
            .is_terminal()
        );
        assert!(!AgentStatus::Running.is_terminal());
        assert!(!AgentStatus::Waiting.is_terminal());
    }

    #[test]
    fn exhaustion_tracks_iteration_limit() {
        let mut agent = Agent::new(AgentKind::Verifier, None, SandboxId::new());
        agent.iteration = 49;
        assert!(!agent.is_exhausted());
        agent.iteration = 50;
        assert!(agent.is_exhausted());
    }
}
