//! Strix Core - Foundation types and traits for the Strix scan runtime.
//!
//! This crate provides:
//! - The data model shared by every component: scans, agents, messages,
//!   tool calls, finding reports, and inter-agent mail.
//! - The cross-cutting error taxonomy for the runtime.
//! - Retry utilities with exponential backoff, used by the LLM gateway and
//!   the sandbox runtime.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod agent;
pub mod error;
pub mod finding;
pub mod ids;
pub mod mail;
pub mod message;
pub mod retry;
pub mod scan;
pub mod timestamp;

pub use agent::{Agent, AgentKind, AgentState, AgentStatus, UsageCounters};
pub use error::{StrixError, StrixResult};
pub use finding::{FindingReport, FindingStatus, RejectionReason};
pub use ids::{AgentId, FindingId, SandboxId, ScanId, ToolCallId, WorkerId};
pub use mail::AgentMessage;
pub use message::{Message, MessageRole, ToolCall, ToolCallOutcome};
pub use retry::{RetryConfig, retry};
pub use scan::{Scan, ScanMode};
pub use timestamp::Timestamp;
