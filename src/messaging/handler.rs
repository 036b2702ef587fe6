//! Handler contracts for bus subscribers.
//!
//! A [`MessageHandler`] processes one message of the bus's message type; an
//! [`EventHandler`] additionally names the event type tag it wants to receive,
//! which is what the registration pass uses to wire discovered handlers to the
//! event bus.

use async_trait::async_trait;

use super::message::DomainEvent;

/// A unit of logic invoked once per matching publish.
///
/// Handlers receive a shared reference to the published message and must not
/// mutate it. Failures are surfaced to the publisher after all sibling
/// handlers have settled.
#[async_trait]
pub trait MessageHandler<M>: Send + Sync {
    /// Handler name used in delivery logs.
    fn name(&self) -> &str {
        "unnamed_handler"
    }

    /// Process one message.
    async fn handle(&self, message: &M) -> anyhow::Result<()>;
}

/// A message handler bound to exactly one domain event type.
pub trait EventHandler: MessageHandler<DomainEvent> {
    /// The event type tag this handler wants to receive.
    fn event_type(&self) -> String;
}
