//! Inter-agent mail, routed by the Agent Graph (`strix-graph`).

use serde::{Deserialize, Serialize};

use crate::ids::AgentId;
use crate::timestamp::Timestamp;

/// A message sent from one agent to another through the Agent Graph.
///
/// The `read` flag becomes `true` when the recipient's engine drains it via
/// `receive`; an agent with unread mail cannot reach the `finished` status
/// (§4.5, §4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMessage {
    /// Sending agent.
    pub from: AgentId,
    /// Receiving agent.
    pub to: AgentId,
    /// Message body.
    pub body: String,
    /// When the message was sent.
    pub sent_at: Timestamp,
    /// Whether the recipient has drained this message.
    pub read: bool,
}

impl AgentMessage {
    /// Create a new, unread message.
    #[must_use]
    pub fn new(from: AgentId, to: AgentId, body: impl Into<String>) -> Self {
        Self {
            from,
            to,
            body: body.into(),
            sent_at: Timestamp::now(),
            read: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_messages_are_unread() {
        let msg = AgentMessage::new(AgentId::new(), AgentId::new(), "hello");
        assert!(!msg.read);
    }
}
