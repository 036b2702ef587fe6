#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Conductor Core
//!
//! In-process event-driven coordination core for modular services: a
//! publish/subscribe message bus carrying typed domain events, and a
//! cron-driven job scheduler executing background work with bounded
//! concurrency and automatic retry.
//!
//! ## Overview
//!
//! Independently-owned business modules coordinate without calling each
//! other directly: a write in one module publishes a domain event, handlers
//! in other modules react to it, and periodic maintenance runs on cron
//! cadences without manual orchestration.
//!
//! This is deliberately not a broker and not a distributed task queue.
//! Messages are not persisted, never cross process boundaries, and are lost
//! on crash; jobs run only within the hosting process.
//!
//! ## Module Organization
//!
//! - [`messaging`] - Message/event model, generic message bus, event bus
//! - [`registry`] - Startup binding of handler modules to the event bus
//! - [`scheduler`] - Job abstraction, cron handling, retrying scheduler
//! - [`config`] - Typed configuration with file/environment layering
//! - [`core`] - Explicitly constructed coordination context
//! - [`error`] - Top-level error type
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use conductor_core::config::CoordinationConfig;
//! use conductor_core::core::CoordinationCore;
//! use conductor_core::messaging::{DomainEvent, EventHandler, MessageHandler, Payload};
//!
//! struct ProtocolLinker;
//!
//! #[async_trait]
//! impl MessageHandler<DomainEvent> for ProtocolLinker {
//!     fn name(&self) -> &str {
//!         "protocol_linker"
//!     }
//!
//!     async fn handle(&self, event: &DomainEvent) -> anyhow::Result<()> {
//!         tracing::info!(user_id = event.aggregate_id(), "linking protocol to user");
//!         Ok(())
//!     }
//! }
//!
//! impl EventHandler for ProtocolLinker {
//!     fn event_type(&self) -> String {
//!         "user.created".to_string()
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let core = CoordinationCore::new(CoordinationConfig::default());
//!
//! let handler = Arc::new(ProtocolLinker);
//! core.event_bus()
//!     .subscribe_to_event(&handler.event_type(), handler);
//!
//! core.event_bus()
//!     .publish(&DomainEvent::new("user.created", "user-1", Payload::new()))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod messaging;
pub mod registry;
pub mod scheduler;

pub use crate::config::{BusConfig, ConfigError, CoordinationConfig, LogLevel, SchedulerConfig};
pub use crate::core::CoordinationCore;
pub use error::{CoordinationError, Result};
pub use messaging::{
    BusMessage, DomainEvent, EventBus, EventHandler, InMemoryMessageBus, Message, MessageHandler,
    MessagingError, Payload,
};
pub use registry::{register_event_handlers, HandlerModule, RegistrationSummary};
pub use scheduler::{Job, JobConfig, JobContext, JobScheduler, JobStatus, SchedulerError};
