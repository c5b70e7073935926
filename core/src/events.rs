//! Failure notifications.
//!
//! # Design
//! `FailureBus` is an explicitly constructed broadcast channel. The client
//! publishes one `FailureEvent` per failed, non-suppressed call; listeners
//! such as an alert UI subscribe to the same bus instance. Publishing never
//! blocks and never fails the call: with no subscribers the event is dropped,
//! and slow subscribers observe `RecvError::Lagged`.

use tokio::sync::broadcast;

use crate::http::HttpMethod;

const DEFAULT_CAPACITY: usize = 64;

/// A failed API call, as seen by listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureEvent {
    pub method: HttpMethod,
    pub endpoint: String,
    /// Embedded status code of a rejected payload.
    pub status: Option<u64>,
    /// Human-readable summary.
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct FailureBus {
    sender: broadcast::Sender<FailureEvent>,
}

impl FailureBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FailureEvent> {
        self.sender.subscribe()
    }

    /// Returns how many subscribers received the event.
    pub fn publish(&self, event: FailureEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for FailureBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> FailureEvent {
        FailureEvent {
            method: HttpMethod::Get,
            endpoint: "http://localhost/notes".to_string(),
            status: None,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn publish_without_subscribers_is_dropped() {
        let bus = FailureBus::default();
        assert_eq!(bus.publish(event()), 0);
    }

    #[test]
    fn every_subscriber_sees_the_event() {
        let bus = FailureBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.clone().subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        assert_eq!(bus.publish(event()), 2);
        assert_eq!(first.try_recv().unwrap(), event());
        assert_eq!(second.try_recv().unwrap(), event());
    }
}
