//! # Registry
//!
//! Startup-time binding of statically-declared handler modules to the event
//! bus, preserving the rule that one broken module never blocks the rest of
//! the registration pass.

pub mod handler_registry;

pub use handler_registry::{register_event_handlers, HandlerModule, RegistrationSummary};
