//! Best-effort change notifications.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::session::{SessionId, SessionSnapshot};

/// Emitted after every accepted admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub session_id: SessionId,
    pub session: SessionSnapshot,
}

/// Non-blocking publisher; having no listener is fine.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<SessionUpdate>,
}

impl Notifier {
    /// `capacity` bounds how far a slow listener may lag before it skips updates.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.tx.subscribe()
    }

    /// Publishes `update`; returns how many listeners it reached.
    pub fn publish(&self, update: SessionUpdate) -> usize {
        match self.tx.send(update) {
            Ok(n) => n,
            Err(_) => {
                tracing::trace!("session update dropped: no listener");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(id: &str) -> SessionUpdate {
        SessionUpdate {
            session_id: SessionId::from(id),
            session: SessionSnapshot::empty(SessionId::from(id)),
        }
    }

    #[test]
    fn publish_without_listener_is_not_an_error() {
        let n = Notifier::new(4);
        assert_eq!(n.publish(update("a")), 0);
    }

    #[tokio::test]
    async fn listeners_receive_updates() {
        let n = Notifier::new(4);
        let mut rx = n.subscribe();
        assert_eq!(n.publish(update("a")), 1);
        assert_eq!(rx.recv().await.unwrap().session_id, SessionId::from("a"));
    }
}
