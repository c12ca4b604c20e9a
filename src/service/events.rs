//! Realtime fan-out of proposal events to connected subscribers

use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;

const CHANNEL_CAPACITY: usize = 64;

/// Payload of the `proposal-received` event
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalReceived {
    pub proposal_id: String,
    pub rfp_id: String,
    pub vendor_id: String,
}

/// Fire-and-forget broadcast channel for live updates.
///
/// There is no delivery guarantee and no retained event log; a subscriber
/// connecting after an event sees nothing.
#[derive(Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<ProposalReceived>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribe to future events
    pub fn subscribe(&self) -> broadcast::Receiver<ProposalReceived> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers
    pub fn publish(&self, event: ProposalReceived) {
        let subscribers = self.sender.send(event).unwrap_or(0);
        tracing::debug!(subscribers, "Broadcast proposal-received event");
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers_does_not_panic() {
        let broadcaster = EventBroadcaster::new();
        broadcaster.publish(ProposalReceived {
            proposal_id: "p1".to_string(),
            rfp_id: "r1".to_string(),
            vendor_id: "v1".to_string(),
        });
    }

    #[test]
    fn test_subscriber_receives_event() {
        let broadcaster = EventBroadcaster::new();
        let mut receiver = broadcaster.subscribe();

        broadcaster.publish(ProposalReceived {
            proposal_id: "p1".to_string(),
            rfp_id: "r1".to_string(),
            vendor_id: "v1".to_string(),
        });

        let event = receiver.try_recv().unwrap();
        assert_eq!(event.proposal_id, "p1");
        assert_eq!(event.rfp_id, "r1");
        assert_eq!(event.vendor_id, "v1");
    }

    #[test]
    fn test_late_subscriber_sees_nothing() {
        let broadcaster = EventBroadcaster::new();
        broadcaster.publish(ProposalReceived {
            proposal_id: "p1".to_string(),
            rfp_id: "r1".to_string(),
            vendor_id: "v1".to_string(),
        });

        let mut receiver = broadcaster.subscribe();
        assert!(receiver.try_recv().is_err());
    }
}
