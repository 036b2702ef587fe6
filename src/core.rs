//! # Coordination Context
//!
//! Explicitly constructed context object bundling the event bus and the job
//! scheduler. There is no process-wide singleton: the process entry point
//! builds a [`CoordinationCore`] from configuration, hands `Arc` handles to
//! the modules that publish, subscribe or schedule, and owns the
//! start/stop lifecycle.
//!
//! ## Usage
//!
//! ```rust
//! use conductor_core::core::CoordinationCore;
//! use conductor_core::config::CoordinationConfig;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let core = CoordinationCore::new(CoordinationConfig::default());
//!
//! // Wiring: registration passes run here, before start.
//! let bus = core.event_bus();
//! let scheduler = core.scheduler();
//!
//! core.start();
//! // ... process lifetime ...
//! core.stop();
//! # }
//! ```

use std::sync::Arc;

use tracing::info;

use crate::config::{ConfigError, CoordinationConfig};
use crate::messaging::EventBus;
use crate::scheduler::JobScheduler;

/// The coordination layer's context object: one event bus, one scheduler,
/// one owner of their lifecycle.
pub struct CoordinationCore {
    config: CoordinationConfig,
    event_bus: Arc<EventBus>,
    scheduler: Arc<JobScheduler>,
}

impl CoordinationCore {
    /// Build a core from explicit configuration.
    pub fn new(config: CoordinationConfig) -> Self {
        Self {
            config,
            event_bus: Arc::new(EventBus::new(config.bus)),
            scheduler: Arc::new(JobScheduler::new(config.scheduler)),
        }
    }

    /// Build a core from environment-loaded configuration.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(CoordinationConfig::load(None)?))
    }

    pub fn config(&self) -> &CoordinationConfig {
        &self.config
    }

    /// Handle to the event bus for publishing and subscription.
    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    /// Handle to the job scheduler for registration and introspection.
    pub fn scheduler(&self) -> Arc<JobScheduler> {
        Arc::clone(&self.scheduler)
    }

    /// Start background work: creates the scheduler's timers. Handler and
    /// job registration must already have happened.
    pub fn start(&self) {
        info!("starting coordination core");
        self.scheduler.start();
    }

    /// Stop background work: cancels timers and pending retries. In-flight
    /// executions drain on their own; publish/subscribe stays usable.
    pub fn stop(&self) {
        self.scheduler.stop();
        info!("coordination core stopped");
    }
}

impl Default for CoordinationCore {
    fn default() -> Self {
        Self::new(CoordinationConfig::default())
    }
}
