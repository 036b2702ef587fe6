//! # Scheduler Error Types
//!
//! Structured errors for job scheduling and execution using thiserror, with
//! constructor helpers for the common cases.

use thiserror::Error;

/// Errors surfaced by the job scheduler.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// A job's cron expression could not be parsed. The job is skipped;
    /// scheduling of other jobs continues.
    #[error("invalid cron expression {expression:?}: {reason}")]
    InvalidSchedule { expression: String, reason: String },

    /// A job execution exhausted its retry ceiling.
    #[error("job {job_name} failed after {attempts} attempts")]
    JobFailed { job_name: String, attempts: u32 },

    /// A pending retry wait was cancelled by scheduler shutdown.
    #[error("job {job_name} retry aborted by shutdown after attempt {attempt}")]
    RetryAborted { job_name: String, attempt: u32 },
}

impl SchedulerError {
    pub fn invalid_schedule(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSchedule {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    pub fn job_failed(job_name: impl Into<String>, attempts: u32) -> Self {
        Self::JobFailed {
            job_name: job_name.into(),
            attempts,
        }
    }

    pub fn retry_aborted(job_name: impl Into<String>, attempt: u32) -> Self {
        Self::RetryAborted {
            job_name: job_name.into(),
            attempt,
        }
    }
}

/// Result type for scheduler operations.
pub type SchedulerResult<T> = std::result::Result<T, SchedulerError>;
