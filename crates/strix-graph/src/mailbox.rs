//! Per-agent mailboxes: the message-queue half of the Agent Graph.

use std::collections::VecDeque;

use strix_core::mail::AgentMessage;
use tokio::sync::{Mutex, Notify};

/// A single agent's inbox: an unread queue plus a wake signal for
/// `wait`.
#[derive(Default)]
pub(crate) struct Mailbox {
    unread: Mutex<VecDeque<AgentMessage>>,
    notify: Notify,
}

impl Mailbox {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn push(&self, mail: AgentMessage) {
        self.unread.lock().await.push_back(mail);
        self.notify.notify_waiters();
    }

    pub(crate) async fn is_empty(&self) -> bool {
        self.unread.lock().await.is_empty()
    }

    /// Drain every unread message, marking them read.
    pub(crate) async fn drain(&self) -> Vec<AgentMessage> {
        self.unread
            .lock()
            .await
            .drain(..)
            .map(|mut m| {
                m.read = true;
                m
            })
            .collect()
    }

    /// Wait until a message arrives. Callers re-check `is_empty` after
    /// waking, since `Notify` permits spurious wakeups across unrelated
    /// pushes.
    pub(crate) async fn notified(&self) {
        self.notify.notified().await;
    }
}
