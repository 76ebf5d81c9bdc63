//! The Agent Engine (C5): one engine instance per [`Agent`](strix_core::agent::Agent),
//! driving the per-iteration think-act loop.
//!
//! Grounded in `astrid_runtime::runtime::AgentRuntime::run_loop` /
//! `execute_tool_call`: the same collect-stream-then-dispatch shape, with
//! the teacher's MCP/plugin/security-interceptor routing collapsed into the
//! Tool Registry's single `runs_in_sandbox` flag, since Strix has exactly
//! two dispatch destinations (host-local, in-sandbox) rather than the
//! teacher's four.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod dispatch;
mod engine;
mod error;

pub use dispatch::SandboxContext;
pub use engine::{AgentEngine, IterationOutcome};
pub use error::EngineError;

/// Tool name reserved for explicit agent completion.
pub const FINISH_TOOL_NAME: &str = "finish";

/// Tool name reserved for an agent that has sent a message expecting a
/// reply and wants to block until one arrives (§4.5's `running → waiting`
/// transition). The Agent Graph itself is outside this crate — the engine
/// only recognizes the name and reports [`IterationOutcome::Waiting`]; the
/// caller that owns the graph (and the 600s auto-resume deadline) drives
/// the actual wait.
pub const AWAIT_REPLY_TOOL_NAME: &str = "await_reply";
