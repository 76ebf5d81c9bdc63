//! The Agent Graph (C6): the parent/child DAG and per-agent message
//! queues that mediate spawn, send, wait, and finish between engines.
//!
//! Grounded in `astrid_runtime::subagent::SubAgentPool`'s depth-bounded
//! spawn and `parent_id` tracking, generalized from a single-result
//! concurrency pool into a DAG with a mailbox per node, since Strix agents
//! exchange arbitrary messages rather than returning one terminal value.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod error;
mod graph;
mod mailbox;

pub use error::GraphError;
pub use graph::{AgentGraph, WaitOutcome, WAITING_AUTO_RESUME};

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use strix_core::ids::AgentId;

    use super::*;

    #[tokio::test]
    async fn spawn_tracks_depth_and_lineage() {
        let graph = AgentGraph::new(3);
        let root = AgentId::new();
        graph.register_root(root.clone()).await;

        let child = graph.spawn(&root).await.unwrap();
        assert_eq!(graph.children_of(&root).await.unwrap(), vec![child.clone()]);

        let grandchild = graph.spawn(&child).await.unwrap();
        let err = graph.spawn(&grandchild).await.unwrap_err();
        assert_eq!(err, GraphError::MaxDepthExceeded(grandchild));
    }

    #[tokio::test]
    async fn finish_refused_with_unread_mail_then_succeeds_after_drain() {
        let graph = AgentGraph::new(3);
        let parent = AgentId::new();
        graph.register_root(parent.clone()).await;
        let child = graph.spawn(&parent).await.unwrap();

        graph.send(&child, &parent, "child says hi").await.unwrap();

        let err = graph.finish(&parent).await.unwrap_err();
        assert_eq!(err, GraphError::UnreadMessages(parent.clone()));

        let mail = graph.receive(&parent).await.unwrap();
        assert_eq!(mail.len(), 1);
        assert_eq!(mail[0].body, "child says hi");

        graph.finish(&parent).await.unwrap();
    }

    #[tokio::test]
    async fn wait_returns_immediately_once_mail_is_pending() {
        let graph = AgentGraph::new(3);
        let root = AgentId::new();
        graph.register_root(root.clone()).await;
        let child = graph.spawn(&root).await.unwrap();

        graph.send(&child, &root, "hello").await.unwrap();
        let outcome = graph.wait(&root, Duration::from_millis(50)).await.unwrap();
        assert_eq!(outcome, WaitOutcome::Delivered);
    }

    #[tokio::test]
    async fn wait_times_out_with_no_mail() {
        let graph = AgentGraph::new(3);
        let root = AgentId::new();
        graph.register_root(root.clone()).await;

        let outcome = graph.wait(&root, Duration::from_millis(20)).await.unwrap();
        assert_eq!(outcome, WaitOutcome::TimedOut);
    }

    #[tokio::test]
    async fn wait_wakes_when_mail_arrives_mid_wait() {
        let graph = std::sync::Arc::new(AgentGraph::new(3));
        let root = AgentId::new();
        graph.register_root(root.clone()).await;
        let child = graph.spawn(&root).await.unwrap();

        let waiter_graph = graph.clone();
        let waiter_root = root.clone();
        let waiter = tokio::spawn(async move { waiter_graph.wait(&waiter_root, Duration::from_secs(5)).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        graph.send(&child, &root, "late message").await.unwrap();

        let outcome = waiter.await.unwrap().unwrap();
        assert_eq!(outcome, WaitOutcome::Delivered);
    }

    #[tokio::test]
    async fn unknown_agent_operations_report_errors() {
        let graph = AgentGraph::new(3);
        let ghost = AgentId::new();
        assert_eq!(graph.spawn(&ghost).await.unwrap_err(), GraphError::UnknownAgent(ghost.clone()));
        assert_eq!(
            graph.finish(&ghost).await.unwrap_err(),
            GraphError::UnknownAgent(ghost.clone())
        );
    }
}
