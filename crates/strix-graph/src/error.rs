//! Agent Graph errors.

use strix_core::ids::AgentId;

/// Failures raised by graph operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GraphError {
    /// The referenced agent has no node in the graph.
    #[error("agent {0} is not registered in the graph")]
    UnknownAgent(AgentId),

    /// Spawning would exceed the configured maximum nesting depth.
    #[error("spawning under {0} would exceed the maximum nesting depth")]
    MaxDepthExceeded(AgentId),

    /// `finish` was called while the agent's mailbox still holds unread
    /// messages (§4.6: "finish requires empty inbox").
    #[error("agent {0} cannot finish with unread messages pending")]
    UnreadMessages(AgentId),
}
