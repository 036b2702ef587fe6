//! # Messaging Error Types
//!
//! Structured error handling for the message bus using thiserror, with
//! constructor helpers for the common cases.

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by publish and registration operations on the bus.
#[derive(Error, Debug)]
pub enum MessagingError {
    /// One or more handlers failed while processing a published message.
    ///
    /// Every subscribed handler is given the chance to run to completion
    /// before this error is produced; `failures` carries one entry per
    /// failing handler.
    #[error(
        "delivery of {message_type} [{message_id}] failed: {failed} of {total} handlers failed: {}",
        .failures.join("; ")
    )]
    Delivery {
        message_id: Uuid,
        message_type: String,
        total: usize,
        failed: usize,
        failures: Vec<String>,
    },

    /// A handler was rejected during registration.
    #[error("handler registration failed for {module}: {reason}")]
    Registration { module: String, reason: String },
}

impl MessagingError {
    /// Create a delivery error from the per-handler failure list.
    pub fn delivery(
        message_id: Uuid,
        message_type: impl Into<String>,
        total: usize,
        failures: Vec<String>,
    ) -> Self {
        Self::Delivery {
            message_id,
            message_type: message_type.into(),
            total,
            failed: failures.len(),
            failures,
        }
    }

    /// Create a registration error.
    pub fn registration(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Registration {
            module: module.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for messaging operations.
pub type MessagingResult<T> = std::result::Result<T, MessagingError>;
