//! # Messaging
//!
//! In-process publish/subscribe for typed domain events.
//!
//! The generic [`InMemoryMessageBus`] fans a published message out to every
//! handler subscribed to its type tag and resolves once all of them have
//! settled. [`EventBus`] specializes it for [`DomainEvent`]s and keeps a
//! secondary handlers-per-event-type index for diagnostics.
//!
//! Messages are not persisted, never cross process boundaries, and are lost
//! on crash — this is a coordination layer, not a broker.

pub mod errors;
pub mod event_bus;
pub mod handler;
pub mod message;
pub mod message_bus;

pub use errors::{MessagingError, MessagingResult};
pub use event_bus::EventBus;
pub use handler::{EventHandler, MessageHandler};
pub use message::{BusMessage, DomainEvent, Message, Payload};
pub use message_bus::InMemoryMessageBus;
