//! # Error Types
//!
//! Top-level error type unifying the per-subsystem errors. Each subsystem
//! keeps its own structured thiserror enum; this wrapper exists for callers
//! that drive both the bus and the scheduler through one result type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::messaging::MessagingError;
use crate::scheduler::SchedulerError;

/// Any error surfaced by the coordination core.
#[derive(Error, Debug)]
pub enum CoordinationError {
    #[error(transparent)]
    Messaging(#[from] MessagingError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for coordination core operations.
pub type Result<T> = std::result::Result<T, CoordinationError>;
