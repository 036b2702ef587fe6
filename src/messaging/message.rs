//! # Message and Domain Event Model
//!
//! The immutable data shapes carried through the bus.
//!
//! A [`Message`] is the generic routed unit: an id assigned at construction, a
//! type tag that determines routing, a JSON payload, a timestamp and an
//! optional correlation id. A [`DomainEvent`] wraps a message and adds the
//! aggregate identity and version that domain consumers need.
//!
//! Both shapes are read-only after construction; the bus hands out shared
//! references during fan-out and never stores them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Payload type carried by every message: an insertion-ordered JSON object.
pub type Payload = Map<String, Value>;

/// Anything routable through the bus: has a unique id and a type tag.
pub trait BusMessage: Send + Sync + 'static {
    /// Unique id assigned at construction, never reused.
    fn id(&self) -> Uuid;

    /// Type tag that determines routing. Never empty.
    fn type_tag(&self) -> &str;

    /// Correlation id linking this message to the operation that produced it.
    fn correlation_id(&self) -> Option<&str>;
}

/// A generic message routed by type tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    id: Uuid,
    message_type: String,
    payload: Payload,
    timestamp: DateTime<Utc>,
    correlation_id: Option<String>,
}

impl Message {
    /// Create a message with a fresh id and the current timestamp.
    pub fn new(message_type: impl Into<String>, payload: Payload) -> Self {
        let message_type = message_type.into();
        debug_assert!(!message_type.is_empty(), "message type tag must not be empty");

        Self {
            id: Uuid::new_v4(),
            message_type,
            payload,
            timestamp: Utc::now(),
            correlation_id: None,
        }
    }

    /// Attach a correlation id linking this message to a wider operation.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl BusMessage for Message {
    fn id(&self) -> Uuid {
        self.id
    }

    fn type_tag(&self) -> &str {
        &self.message_type
    }

    fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }
}

/// An immutable record of something that happened to a specific aggregate.
///
/// Wraps a [`Message`] and adds the aggregate id and the event version
/// (starts at 1). Constructed at the moment of publish, consumed by fan-out,
/// never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    #[serde(flatten)]
    message: Message,
    aggregate_id: String,
    version: u32,
}

impl DomainEvent {
    /// Create a version-1 event for the given aggregate.
    pub fn new(
        event_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        payload: Payload,
    ) -> Self {
        Self {
            message: Message::new(event_type, payload),
            aggregate_id: aggregate_id.into(),
            version: 1,
        }
    }

    /// Override the event version (schema/occurrence version, defaults to 1).
    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Attach a correlation id linking this event to a wider operation.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.message = self.message.with_correlation_id(correlation_id);
        self
    }

    pub fn event_type(&self) -> &str {
        self.message.message_type()
    }

    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn payload(&self) -> &Payload {
        self.message.payload()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.message.timestamp()
    }

    /// The underlying routed message.
    pub fn message(&self) -> &Message {
        &self.message
    }
}

impl BusMessage for DomainEvent {
    fn id(&self) -> Uuid {
        self.message.id()
    }

    fn type_tag(&self) -> &str {
        self.message.message_type()
    }

    fn correlation_id(&self) -> Option<&str> {
        self.message.correlation_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload_with(key: &str, value: Value) -> Payload {
        let mut payload = Payload::new();
        payload.insert(key.to_string(), value);
        payload
    }

    #[test]
    fn message_ids_are_unique() {
        let a = Message::new("user.created", Payload::new());
        let b = Message::new("user.created", Payload::new());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn domain_event_defaults_to_version_one() {
        let event = DomainEvent::new("user.created", "user-1", Payload::new());
        assert_eq!(event.version(), 1);
        assert_eq!(event.aggregate_id(), "user-1");
        assert_eq!(event.type_tag(), "user.created");
        assert!(event.correlation_id().is_none());
    }

    #[test]
    fn correlation_id_flows_through_builder() {
        let event = DomainEvent::new("user.created", "user-1", Payload::new())
            .with_correlation_id("req-42");
        assert_eq!(event.correlation_id(), Some("req-42"));
    }

    #[test]
    fn payload_preserves_insertion_order() {
        let mut payload = Payload::new();
        payload.insert("zulu".to_string(), json!(1));
        payload.insert("alpha".to_string(), json!(2));
        let event = DomainEvent::new("user.created", "user-1", payload);

        let keys: Vec<&String> = event.payload().keys().collect();
        assert_eq!(keys, ["zulu", "alpha"]);
    }

    #[test]
    fn domain_event_serializes_flat() {
        let event = DomainEvent::new(
            "protocol.created",
            "protocol-7",
            payload_with("user_id", json!("user-1")),
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["message_type"], "protocol.created");
        assert_eq!(value["aggregate_id"], "protocol-7");
        assert_eq!(value["version"], 1);
        assert_eq!(value["payload"]["user_id"], "user-1");
    }
}
