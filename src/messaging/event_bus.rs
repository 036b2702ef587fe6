//! # Event Bus
//!
//! Specialization of the message bus for domain events. Subscription and
//! unsubscription delegate to the underlying [`InMemoryMessageBus`], while a
//! secondary index of handlers per event type is kept for diagnostics —
//! reporting what is wired up without touching the routing tables.
//!
//! Both indices mutate together inside each operation; `publish` behavior is
//! inherited unchanged from the message bus.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use conductor_core::config::BusConfig;
//! use conductor_core::messaging::{DomainEvent, EventBus, EventHandler, MessageHandler, Payload};
//!
//! struct WelcomeMailer;
//!
//! #[async_trait]
//! impl MessageHandler<DomainEvent> for WelcomeMailer {
//!     fn name(&self) -> &str {
//!         "welcome_mailer"
//!     }
//!
//!     async fn handle(&self, _event: &DomainEvent) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! impl EventHandler for WelcomeMailer {
//!     fn event_type(&self) -> String {
//!         "user.created".to_string()
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let bus = EventBus::new(BusConfig::default());
//! let handler = Arc::new(WelcomeMailer);
//! bus.subscribe_to_event(&handler.event_type(), handler);
//!
//! bus.publish(&DomainEvent::new("user.created", "user-1", Payload::new()))
//!     .await?;
//! assert_eq!(bus.handlers_for_event("user.created").len(), 1);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::config::BusConfig;

use super::errors::MessagingResult;
use super::handler::{EventHandler, MessageHandler};
use super::message::DomainEvent;
use super::message_bus::InMemoryMessageBus;

/// Publish/subscribe bus for domain events with a per-event-type handler
/// index for introspection.
pub struct EventBus {
    bus: InMemoryMessageBus<DomainEvent>,
    event_handlers: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
}

impl EventBus {
    pub fn new(config: BusConfig) -> Self {
        Self {
            bus: InMemoryMessageBus::new(config),
            event_handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe a handler to an event type.
    ///
    /// Delegates to the underlying message bus and records the handler in the
    /// diagnostics index. Idempotent per handler instance.
    pub fn subscribe_to_event(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        let routed: Arc<dyn MessageHandler<DomainEvent>> = handler.clone();
        self.bus.subscribe(event_type, routed);

        let mut index = self.event_handlers.write();
        let entry = index.entry(event_type.to_string()).or_default();
        if !entry.iter().any(|existing| Arc::ptr_eq(existing, &handler)) {
            entry.push(handler);
        }
        info!(event_type, "event handler registered");
    }

    /// Unsubscribe a handler from an event type. No-op if it was not
    /// subscribed.
    pub fn unsubscribe_from_event(&self, event_type: &str, handler: &Arc<dyn EventHandler>) {
        let routed: Arc<dyn MessageHandler<DomainEvent>> = handler.clone();
        self.bus.unsubscribe(event_type, &routed);

        let mut index = self.event_handlers.write();
        if let Some(entry) = index.get_mut(event_type) {
            entry.retain(|existing| !Arc::ptr_eq(existing, handler));
            if entry.is_empty() {
                index.remove(event_type);
            }
        }
    }

    /// Handlers currently wired to an event type, for diagnostics.
    pub fn handlers_for_event(&self, event_type: &str) -> Vec<Arc<dyn EventHandler>> {
        self.event_handlers
            .read()
            .get(event_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Fan an event out to every subscribed handler. Inherited unchanged from
    /// the message bus.
    pub async fn publish(&self, event: &DomainEvent) -> MessagingResult<()> {
        self.bus.publish(event).await
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::message::Payload;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RecordingHandler {
        event_type: &'static str,
        seen: AtomicUsize,
    }

    impl RecordingHandler {
        fn new(event_type: &'static str) -> Arc<Self> {
            Arc::new(Self {
                event_type,
                seen: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl MessageHandler<DomainEvent> for RecordingHandler {
        fn name(&self) -> &str {
            "recording_handler"
        }

        async fn handle(&self, _event: &DomainEvent) -> anyhow::Result<()> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl EventHandler for RecordingHandler {
        fn event_type(&self) -> String {
            self.event_type.to_string()
        }
    }

    #[tokio::test]
    async fn subscription_updates_both_indices() {
        let bus = EventBus::default();
        let handler = RecordingHandler::new("user.created");
        bus.subscribe_to_event("user.created", handler.clone());

        assert_eq!(bus.handlers_for_event("user.created").len(), 1);

        bus.publish(&DomainEvent::new("user.created", "user-1", Payload::new()))
            .await
            .unwrap();
        assert_eq!(handler.seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unsubscription_updates_both_indices() {
        let bus = EventBus::default();
        let handler = RecordingHandler::new("user.created");
        bus.subscribe_to_event("user.created", handler.clone());

        let as_event_handler: Arc<dyn EventHandler> = handler.clone();
        bus.unsubscribe_from_event("user.created", &as_event_handler);

        assert!(bus.handlers_for_event("user.created").is_empty());
        bus.publish(&DomainEvent::new("user.created", "user-1", Payload::new()))
            .await
            .unwrap();
        assert_eq!(handler.seen.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn duplicate_event_subscription_registers_once() {
        let bus = EventBus::default();
        let handler = RecordingHandler::new("user.created");
        bus.subscribe_to_event("user.created", handler.clone());
        bus.subscribe_to_event("user.created", handler.clone());

        assert_eq!(bus.handlers_for_event("user.created").len(), 1);
        bus.publish(&DomainEvent::new("user.created", "user-1", Payload::new()))
            .await
            .unwrap();
        assert_eq!(handler.seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn handlers_for_unknown_event_is_empty() {
        let bus = EventBus::default();
        assert!(bus.handlers_for_event("missing.event").is_empty());
    }
}
