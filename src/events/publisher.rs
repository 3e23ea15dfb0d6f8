//! # Event Publisher
//!
//! In-process broadcast of fulfillment lifecycle events.
//!
//! ```rust
//! use fulfillment_core::constants::events;
//! use fulfillment_core::events::EventPublisher;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let publisher = EventPublisher::new(16);
//! let mut rx = publisher.subscribe();
//!
//! publisher
//!     .publish(events::LABEL_VOIDED, json!({"label": "order-3"}))
//!     .unwrap();
//!
//! let event = rx.recv().await.unwrap();
//! assert_eq!(event.name, events::LABEL_VOIDED);
//! # });
//! ```

use serde_json::Value;
use tokio::sync::broadcast;

use crate::config::EventsConfig;

/// Broadcasts fulfillment lifecycle events to any number of listeners
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<PublishedEvent>,
}

/// Event that has been published
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub name: String,
    pub context: Value,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn from_config(config: &EventsConfig) -> Self {
        Self::new(config.channel_capacity)
    }

    /// Publish an event with the given name and context
    pub fn publish(&self, event_name: impl Into<String>, context: Value) -> Result<(), PublishError> {
        let event = PublishedEvent {
            name: event_name.into(),
            context,
            published_at: chrono::Utc::now(),
        };

        // Publishing with no listeners is not an error
        match self.sender.send(event) {
            Ok(_) => Ok(()),
            Err(broadcast::error::SendError(_)) => Ok(()),
        }
    }

    /// Serialize a payload and publish it
    pub fn publish_serialized<T: serde::Serialize>(
        &self,
        event_name: impl Into<String>,
        payload: &T,
    ) -> Result<(), PublishError> {
        let context = serde_json::to_value(payload)?;
        self.publish(event_name, context)
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Error types for event publishing
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::from_config(&EventsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_publish_without_subscribers_succeeds() {
        let publisher = EventPublisher::new(8);
        assert_eq!(publisher.subscriber_count(), 0);
        assert!(publisher.publish("label.voided", json!({"id": 1})).is_ok());
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let publisher = EventPublisher::default();
        let mut rx = publisher.subscribe();

        publisher
            .publish_serialized("batch.processed", &json!({"entries": 3}))
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.name, "batch.processed");
        assert_eq!(event.context["entries"], 3);
    }
}
