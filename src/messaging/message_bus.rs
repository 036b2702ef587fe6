//! # In-Memory Message Bus
//!
//! Generic publish/subscribe core. Subscriptions are keyed by message type
//! tag; a published message fans out to every subscribed handler
//! concurrently, and `publish` resolves only once all of them have settled.
//!
//! ## Concurrency
//!
//! The subscription map lives behind a `parking_lot` read/write lock that is
//! only ever held across the synchronous portion of an operation — the
//! subscriber list is cloned out of the lock before fan-out, so no lock is
//! held across an await point.
//!
//! ## Failure policy
//!
//! Handlers are never short-circuited by a sibling's failure. Each failing
//! handler is logged individually with the message id and type, and `publish`
//! fails with an aggregate [`MessagingError::Delivery`] once every handler has
//! had its turn.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use conductor_core::config::BusConfig;
//! use conductor_core::messaging::{InMemoryMessageBus, Message, MessageHandler, Payload};
//!
//! struct AuditTrail;
//!
//! #[async_trait]
//! impl MessageHandler<Message> for AuditTrail {
//!     fn name(&self) -> &str {
//!         "audit_trail"
//!     }
//!
//!     async fn handle(&self, _message: &Message) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let bus: InMemoryMessageBus<Message> = InMemoryMessageBus::new(BusConfig::default());
//! bus.subscribe("user.created", Arc::new(AuditTrail));
//! bus.publish(&Message::new("user.created", Payload::new())).await?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::RwLock;
use tracing::{debug, error};

use crate::config::{BusConfig, LogLevel};

use super::errors::{MessagingError, MessagingResult};
use super::handler::MessageHandler;
use super::message::BusMessage;

type HandlerList<M> = Vec<Arc<dyn MessageHandler<M>>>;

/// Generic in-process publish/subscribe bus.
pub struct InMemoryMessageBus<M: BusMessage> {
    config: BusConfig,
    handlers: RwLock<HashMap<String, HandlerList<M>>>,
}

impl<M: BusMessage> InMemoryMessageBus<M> {
    pub fn new(config: BusConfig) -> Self {
        Self {
            config,
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Add `handler` to the subscriber set for `type_tag`.
    ///
    /// Idempotent per handler instance: registering the same `Arc` twice for
    /// the same tag is a no-op. Always succeeds.
    pub fn subscribe(&self, type_tag: &str, handler: Arc<dyn MessageHandler<M>>) {
        let mut handlers = self.handlers.write();
        let entry = handlers.entry(type_tag.to_string()).or_default();
        if entry.iter().any(|existing| Arc::ptr_eq(existing, &handler)) {
            debug!(
                message_type = type_tag,
                handler = handler.name(),
                "handler already subscribed, ignoring"
            );
            return;
        }
        entry.push(handler);
        debug!(message_type = type_tag, "handler subscribed to message type");
    }

    /// Remove `handler` from the subscriber set for `type_tag`, if present.
    pub fn unsubscribe(&self, type_tag: &str, handler: &Arc<dyn MessageHandler<M>>) {
        let mut handlers = self.handlers.write();
        if let Some(entry) = handlers.get_mut(type_tag) {
            entry.retain(|existing| !Arc::ptr_eq(existing, handler));
            debug!(
                message_type = type_tag,
                "handler unsubscribed from message type"
            );
        }
    }

    /// Number of handlers currently subscribed to `type_tag`.
    pub fn subscriber_count(&self, type_tag: &str) -> usize {
        self.handlers
            .read()
            .get(type_tag)
            .map_or(0, |list| list.len())
    }

    /// Fan a message out to every handler subscribed to its type tag.
    ///
    /// All matching handlers run concurrently against the same message
    /// instance, and this call resolves only after every one of them has
    /// settled. Publishing into a tag with no subscribers succeeds; the
    /// condition is surfaced as an observability signal at the configured
    /// level.
    pub async fn publish(&self, message: &M) -> MessagingResult<()> {
        let handlers: HandlerList<M> = {
            let map = self.handlers.read();
            match map.get(message.type_tag()) {
                Some(list) if !list.is_empty() => list.clone(),
                _ => {
                    self.log_unhandled(message);
                    return Ok(());
                }
            }
        };

        debug!(
            message_id = %message.id(),
            message_type = message.type_tag(),
            handlers = handlers.len(),
            "publishing message"
        );

        let total = handlers.len();
        let outcomes = join_all(handlers.iter().map(|handler| async move {
            handler.handle(message).await.map_err(|cause| {
                error!(
                    message_id = %message.id(),
                    message_type = message.type_tag(),
                    handler = handler.name(),
                    error = ?cause,
                    "error handling message"
                );
                format!("{}: {cause:#}", handler.name())
            })
        }))
        .await;

        let failures: Vec<String> = outcomes.into_iter().filter_map(Result::err).collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(MessagingError::delivery(
                message.id(),
                message.type_tag(),
                total,
                failures,
            ))
        }
    }

    fn log_unhandled(&self, message: &M) {
        let type_tag = message.type_tag();
        match self.config.unhandled_message_level {
            LogLevel::Trace => {
                tracing::trace!(message_type = type_tag, "no handlers found for message type");
            }
            LogLevel::Debug => {
                tracing::debug!(message_type = type_tag, "no handlers found for message type");
            }
            LogLevel::Info => {
                tracing::info!(message_type = type_tag, "no handlers found for message type");
            }
            LogLevel::Warn => {
                tracing::warn!(message_type = type_tag, "no handlers found for message type");
            }
            LogLevel::Error => {
                tracing::error!(message_type = type_tag, "no handlers found for message type");
            }
        }
    }
}

impl<M: BusMessage> Default for InMemoryMessageBus<M> {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::message::{Message, Payload};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingHandler {
        invocations: AtomicUsize,
        delay: Duration,
        fail: bool,
    }

    impl CountingHandler {
        fn new() -> Arc<Self> {
            Self::with(Duration::ZERO, false)
        }

        fn with(delay: Duration, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                invocations: AtomicUsize::new(0),
                delay,
                fail,
            })
        }

        fn invocations(&self) -> usize {
            self.invocations.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MessageHandler<Message> for CountingHandler {
        fn name(&self) -> &str {
            "counting_handler"
        }

        async fn handle(&self, _message: &Message) -> anyhow::Result<()> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.invocations.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("handler exploded");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_succeeds() {
        let bus: InMemoryMessageBus<Message> = InMemoryMessageBus::default();
        let message = Message::new("nobody.listens", Payload::new());
        assert!(bus.publish(&message).await.is_ok());
    }

    #[tokio::test]
    async fn publish_invokes_every_subscriber() {
        let bus: InMemoryMessageBus<Message> = InMemoryMessageBus::default();
        let first = CountingHandler::new();
        let second = CountingHandler::new();
        bus.subscribe("user.created", first.clone());
        bus.subscribe("user.created", second.clone());

        bus.publish(&Message::new("user.created", Payload::new()))
            .await
            .unwrap();

        assert_eq!(first.invocations(), 1);
        assert_eq!(second.invocations(), 1);
    }

    #[tokio::test]
    async fn duplicate_subscription_is_idempotent() {
        let bus: InMemoryMessageBus<Message> = InMemoryMessageBus::default();
        let handler = CountingHandler::new();
        bus.subscribe("user.created", handler.clone());
        bus.subscribe("user.created", handler.clone());
        assert_eq!(bus.subscriber_count("user.created"), 1);

        bus.publish(&Message::new("user.created", Payload::new()))
            .await
            .unwrap();
        assert_eq!(handler.invocations(), 1);
    }

    #[tokio::test]
    async fn unsubscribe_removes_handler() {
        let bus: InMemoryMessageBus<Message> = InMemoryMessageBus::default();
        let handler = CountingHandler::new();
        bus.subscribe("user.created", handler.clone());

        let as_message_handler: Arc<dyn MessageHandler<Message>> = handler.clone();
        bus.unsubscribe("user.created", &as_message_handler);
        assert_eq!(bus.subscriber_count("user.created"), 0);

        // Absent handler: no-op, no error.
        bus.unsubscribe("user.created", &as_message_handler);
    }

    #[tokio::test(start_paused = true)]
    async fn publish_waits_for_the_slowest_handler() {
        let bus: InMemoryMessageBus<Message> = InMemoryMessageBus::default();
        let fast = CountingHandler::with(Duration::from_millis(10), false);
        let slow = CountingHandler::with(Duration::from_millis(250), false);
        bus.subscribe("report.ready", fast.clone());
        bus.subscribe("report.ready", slow.clone());

        let started = tokio::time::Instant::now();
        bus.publish(&Message::new("report.ready", Payload::new()))
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(250));
        assert_eq!(fast.invocations(), 1);
        assert_eq!(slow.invocations(), 1);
    }

    #[tokio::test]
    async fn failing_handler_does_not_short_circuit_siblings() {
        let bus: InMemoryMessageBus<Message> = InMemoryMessageBus::default();
        let failing = CountingHandler::with(Duration::ZERO, true);
        let healthy = CountingHandler::with(Duration::from_millis(5), false);
        bus.subscribe("user.created", failing.clone());
        bus.subscribe("user.created", healthy.clone());

        let message = Message::new("user.created", Payload::new());
        let result = bus.publish(&message).await;

        let error = result.unwrap_err();
        match error {
            MessagingError::Delivery { total, failed, .. } => {
                assert_eq!(total, 2);
                assert_eq!(failed, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(failing.invocations(), 1);
        assert_eq!(healthy.invocations(), 1);
    }
}
