//! # Event Handler Registration
//!
//! Binds a statically-assembled table of handler modules to the event bus at
//! startup. Each [`HandlerModule`] names the business module and lists the
//! handler instances it exports; the registration pass wires each module's
//! first well-formed handler to its event type and reports what happened.
//!
//! Failure isolation is the contract: a module exporting no handler, or a
//! handler with an empty event type, is logged and skipped — it never
//! prevents the remaining modules from registering.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use conductor_core::messaging::{DomainEvent, EventBus, EventHandler, MessageHandler};
//! use conductor_core::registry::{register_event_handlers, HandlerModule};
//!
//! struct ProtocolLinker;
//!
//! #[async_trait]
//! impl MessageHandler<DomainEvent> for ProtocolLinker {
//!     fn name(&self) -> &str {
//!         "protocol_linker"
//!     }
//!
//!     async fn handle(&self, _event: &DomainEvent) -> anyhow::Result<()> {
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
//! let bus = EventBus::default();
//! let summary = register_event_handlers(
//!     &bus,
//!     vec![HandlerModule::new("user", vec![Arc::new(ProtocolLinker)])],
//! );
//! assert_eq!(summary.registered, 1);
//! ```

use std::sync::Arc;

use tracing::{info, warn};

use crate::messaging::{EventBus, EventHandler};

/// One business module's entry in the static registration table: the module
/// name (for logs) and the handler instances it exports.
pub struct HandlerModule {
    pub name: String,
    pub handlers: Vec<Arc<dyn EventHandler>>,
}

impl HandlerModule {
    pub fn new(name: impl Into<String>, handlers: Vec<Arc<dyn EventHandler>>) -> Self {
        Self {
            name: name.into(),
            handlers,
        }
    }
}

/// Outcome of one registration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationSummary {
    /// Modules whose handler was bound to the bus.
    pub registered: usize,
    /// Modules skipped for exporting no usable handler.
    pub skipped: usize,
}

/// Bind every module's first well-formed handler to the event bus.
///
/// A module with no usable handler is logged as a warning and skipped; the
/// pass always continues through the whole table.
pub fn register_event_handlers(
    bus: &EventBus,
    modules: Vec<HandlerModule>,
) -> RegistrationSummary {
    let mut summary = RegistrationSummary::default();

    for module in modules {
        let exported = module.handlers.len();
        let handler = module
            .handlers
            .into_iter()
            .find(|handler| !handler.event_type().is_empty());

        match handler {
            Some(handler) => {
                let event_type = handler.event_type();
                bus.subscribe_to_event(&event_type, handler);
                info!(
                    module = %module.name,
                    event_type = %event_type,
                    "registered event handler"
                );
                summary.registered += 1;
            }
            None => {
                warn!(
                    module = %module.name,
                    exported,
                    "no usable event handler exported by module"
                );
                summary.skipped += 1;
            }
        }
    }

    info!(
        registered = summary.registered,
        skipped = summary.skipped,
        "event handler registration completed"
    );
    summary
}
