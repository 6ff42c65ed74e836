//! SSE broadcast hub for presence updates.
//!
//! Carries pre-serialized payloads over a tokio broadcast channel; each
//! SSE connection holds a receiver. Slow consumers that lag simply drop
//! frames — every sweep re-sends the full state, so nothing is lost for
//! long.

use tokio::sync::broadcast;
use tracing::trace;

use tickethub_entity::presence::PresenceUpdate;

/// Fan-out hub for the presence stream.
#[derive(Debug)]
pub struct PresenceBroadcaster {
    tx: broadcast::Sender<String>,
}

impl PresenceBroadcaster {
    /// Create a hub with the given per-receiver buffer.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Register a new listener.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    /// Push an update to all listeners. A send with no listeners is not
    /// an error.
    pub fn publish(&self, update: &PresenceUpdate) {
        match serde_json::to_string(update) {
            Ok(payload) => {
                let receivers = self.tx.receiver_count();
                if receivers > 0 {
                    let _ = self.tx.send(payload);
                }
                trace!(receivers, "Presence update published");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize presence update");
            }
        }
    }

    /// Number of connected listeners.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_updates() {
        let hub = PresenceBroadcaster::new(16);
        let mut rx = hub.subscribe();

        hub.publish(&PresenceUpdate::new(vec![]));

        let payload = rx.recv().await.expect("should receive");
        assert!(payload.contains("\"type\":\"presence\""));
        assert!(payload.contains("\"count\":0"));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let hub = PresenceBroadcaster::new(16);
        hub.publish(&PresenceUpdate::new(vec![]));
        assert_eq!(hub.receiver_count(), 0);
    }
}
