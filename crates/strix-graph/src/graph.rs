//! The DAG itself: spawn, send, receive, wait, finish.
//!
//! Grounded in `astrid_runtime::subagent::SubAgentPool`: the same
//! depth-at-spawn-time check and `parent_id`-as-single-edge shape, with the
//! teacher's semaphore-bounded concurrency pool replaced by a plain DAG —
//! concurrency limits belong to the Sandbox Runtime and LLM Gateway here,
//! not the graph — and the teacher's result/error cells replaced by a
//! mailbox per node, since Strix agents communicate by message rather than
//! a single terminal result value.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use strix_core::ids::AgentId;
use strix_core::mail::AgentMessage;
use tokio::sync::RwLock;

use crate::error::GraphError;
use crate::mailbox::Mailbox;

/// Auto-resume deadline for the `waiting → running` transition when no
/// reply arrives (§4.5).
pub const WAITING_AUTO_RESUME: Duration = Duration::from_secs(600);

/// Outcome of [`AgentGraph::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A message was pending (or arrived before the deadline).
    Delivered,
    /// The deadline elapsed with no message delivered.
    TimedOut,
}

struct Node {
    parent_id: Option<AgentId>,
    children: Vec<AgentId>,
    depth: usize,
    mailbox: Arc<Mailbox>,
}

/// The parent/child DAG and per-agent mailboxes for one scan.
///
/// Parent/child links are indices into this graph keyed by [`AgentId`],
/// never direct ownership handles (§9) — this is what makes cycle
/// prevention and teardown tractable regardless of how many agents are
/// alive at once.
pub struct AgentGraph {
    nodes: RwLock<HashMap<AgentId, Node>>,
    max_depth: usize,
}

impl AgentGraph {
    /// A graph bounding nesting to `max_depth` (root agents sit at depth 0).
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            max_depth,
        }
    }

    /// Register the scan's root agent, which has no parent.
    pub async fn register_root(&self, root: AgentId) {
        self.nodes.write().await.insert(
            root,
            Node {
                parent_id: None,
                children: Vec::new(),
                depth: 0,
                mailbox: Arc::new(Mailbox::new()),
            },
        );
    }

    /// Create a new child of `parent`, returning the child's ID.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownAgent`] if `parent` isn't registered, or
    /// [`GraphError::MaxDepthExceeded`] if the child's depth would reach
    /// `max_depth`.
    pub async fn spawn(&self, parent: &AgentId) -> Result<AgentId, GraphError> {
        let mut nodes = self.nodes.write().await;
        let parent_depth = nodes
            .get(parent)
            .ok_or_else(|| GraphError::UnknownAgent(parent.clone()))?
            .depth;

        let child_depth = parent_depth.saturating_add(1);
        if child_depth >= self.max_depth {
            return Err(GraphError::MaxDepthExceeded(parent.clone()));
        }

        drop(nodes);
        // A freshly minted ID can never already be `parent`'s ancestor; this
        // call exists so the one cycle-prevention primitive the graph
        // offers is exercised on every spawn rather than trusted blindly.
        let child = AgentId::new();
        debug_assert!(!self.is_ancestor(&child, parent).await);

        let mut nodes = self.nodes.write().await;
        nodes.insert(
            child.clone(),
            Node {
                parent_id: Some(parent.clone()),
                children: Vec::new(),
                depth: child_depth,
                mailbox: Arc::new(Mailbox::new()),
            },
        );
        nodes
            .get_mut(parent)
            .expect("parent checked above")
            .children
            .push(child.clone());

        Ok(child)
    }

    /// Whether `candidate` is an ancestor of `of` — the graph's one
    /// cycle-prevention primitive (§9): every ID `spawn` mints is fresh, so
    /// spawning alone can never trigger this, but any future operation that
    /// lets a caller nominate an existing node as a new parent must consult
    /// it first.
    async fn is_ancestor(&self, candidate: &AgentId, of: &AgentId) -> bool {
        let nodes = self.nodes.read().await;
        let mut cursor = nodes.get(of).and_then(|n| n.parent_id.clone());
        while let Some(id) = cursor {
            if &id == candidate {
                return true;
            }
            cursor = nodes.get(&id).and_then(|n| n.parent_id.clone());
        }
        false
    }

    /// Enqueue a message for `to`, waking anyone blocked in [`Self::wait`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownAgent`] if `to` isn't registered.
    pub async fn send(&self, from: &AgentId, to: &AgentId, body: impl Into<String>) -> Result<(), GraphError> {
        let mailbox = self.mailbox_of(to).await?;
        mailbox.push(AgentMessage::new(from.clone(), to.clone(), body)).await;
        Ok(())
    }

    /// Drain and return every unread message for `agent`, marking them
    /// read.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownAgent`] if `agent` isn't registered.
    pub async fn receive(&self, agent: &AgentId) -> Result<Vec<AgentMessage>, GraphError> {
        let mailbox = self.mailbox_of(agent).await?;
        Ok(mailbox.drain().await)
    }

    /// Block until a message is pending for `agent` or `deadline` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownAgent`] if `agent` isn't registered.
    pub async fn wait(&self, agent: &AgentId, deadline: Duration) -> Result<WaitOutcome, GraphError> {
        let mailbox = self.mailbox_of(agent).await?;

        if !mailbox.is_empty().await {
            return Ok(WaitOutcome::Delivered);
        }

        tokio::select! {
            () = mailbox.notified() => Ok(WaitOutcome::Delivered),
            () = tokio::time::sleep(deadline) => {
                if mailbox.is_empty().await {
                    Ok(WaitOutcome::TimedOut)
                } else {
                    Ok(WaitOutcome::Delivered)
                }
            }
        }
    }

    /// Reject `finish` while `agent`'s mailbox still holds unread messages
    /// (§4.6, §8's "finish requires empty inbox" invariant).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownAgent`] if `agent` isn't registered, or
    /// [`GraphError::UnreadMessages`] if the mailbox is non-empty.
    pub async fn finish(&self, agent: &AgentId) -> Result<(), GraphError> {
        let mailbox = self.mailbox_of(agent).await?;
        if !mailbox.is_empty().await {
            return Err(GraphError::UnreadMessages(agent.clone()));
        }
        Ok(())
    }

    /// Direct children of `agent`, in spawn order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownAgent`] if `agent` isn't registered.
    pub async fn children_of(&self, agent: &AgentId) -> Result<Vec<AgentId>, GraphError> {
        let nodes = self.nodes.read().await;
        Ok(nodes
            .get(agent)
            .ok_or_else(|| GraphError::UnknownAgent(agent.clone()))?
            .children
            .clone())
    }

    /// Snapshot of every agent ID currently tracked, for the cancellation
    /// sweep described in §5 ("the Agent Graph marks every running agent
    /// `failed(cancelled)`").
    pub async fn all_ids(&self) -> Vec<AgentId> {
        self.nodes.read().await.keys().cloned().collect()
    }

    async fn mailbox_of(&self, agent: &AgentId) -> Result<Arc<Mailbox>, GraphError> {
        let nodes = self.nodes.read().await;
        Ok(nodes
            .get(agent)
            .ok_or_else(|| GraphError::UnknownAgent(agent.clone()))?
            .mailbox
            .clone())
    }
}
