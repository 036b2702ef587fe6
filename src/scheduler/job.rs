//! # Job Abstraction
//!
//! A job is a named, independently schedulable unit of background work: a
//! static [`JobConfig`] (name, cron cadence, flags) plus an implementation of
//! the [`Job`] capability. The scheduler assigns each job a stable random id
//! when it enters the registry and builds a fresh [`JobContext`] for every
//! execution attempt.
//!
//! ## Usage
//!
//! ```rust
//! use async_trait::async_trait;
//! use conductor_core::scheduler::{Job, JobConfig, JobContext};
//!
//! struct CleanupExpiredSessions {
//!     config: JobConfig,
//! }
//!
//! impl CleanupExpiredSessions {
//!     fn new() -> Self {
//!         Self {
//!             config: JobConfig::new("cleanup-expired-sessions", "0 2 * * *"),
//!         }
//!     }
//! }
//!
//! #[async_trait]
//! impl Job for CleanupExpiredSessions {
//!     fn config(&self) -> &JobConfig {
//!         &self.config
//!     }
//!
//!     async fn execute(&self, context: &JobContext) -> anyhow::Result<()> {
//!         tracing::info!(job_id = %context.job_id, attempt = context.attempt, "sweeping sessions");
//!         Ok(())
//!     }
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Static configuration of a scheduled job. `name` is the job's identity;
/// the scheduler rejects a second registration under an already-used name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Unique job name.
    pub name: String,

    /// Standard 5-field cron expression (minute, hour, day of month, month,
    /// day of week).
    pub schedule: String,

    /// Disabled jobs stay registered but never tick.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Fire one immediate execution when the scheduler starts.
    #[serde(default)]
    pub run_on_startup: bool,
}

fn default_enabled() -> bool {
    true
}

impl JobConfig {
    /// Create a config with the defaults: enabled, no startup run.
    pub fn new(name: impl Into<String>, schedule: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schedule: schedule.into(),
            enabled: true,
            run_on_startup: false,
        }
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn run_on_startup(mut self, run_on_startup: bool) -> Self {
        self.run_on_startup = run_on_startup;
        self
    }
}

/// Per-attempt execution context, created fresh for every attempt and
/// discarded at attempt end. Not persisted across restarts.
#[derive(Debug, Clone, Serialize)]
pub struct JobContext {
    /// The job's stable id, identical across all executions of the job.
    pub job_id: Uuid,
    pub job_name: String,
    pub started_at: DateTime<Utc>,
    /// 1-based attempt counter.
    pub attempt: u32,
    /// Retry ceiling for this execution.
    pub max_retries: u32,
}

/// A unit of scheduled background work.
#[async_trait]
pub trait Job: Send + Sync {
    /// The job's static configuration.
    fn config(&self) -> &JobConfig;

    /// Run one attempt. Failures are retried by the scheduler up to the
    /// configured ceiling with exponential backoff.
    async fn execute(&self, context: &JobContext) -> anyhow::Result<()>;
}
