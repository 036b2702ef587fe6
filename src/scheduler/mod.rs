//! # Scheduling
//!
//! Cron-driven background job execution with bounded concurrency and
//! automatic retry.
//!
//! Jobs implement the [`Job`] capability and are registered with the
//! [`JobScheduler`] before [`JobScheduler::start`] creates one recurring
//! timer per enabled job. Executions are admission-controlled against a
//! global concurrency ceiling, mutually excluded per job name, and retried
//! with exponential backoff up to a configured ceiling.
//!
//! Jobs run only within the hosting process — this is not a distributed
//! task queue.

pub mod cron;
pub mod errors;
pub mod job;
pub mod scheduler;

pub use cron::{describe_schedule, parse_schedule};
pub use errors::{SchedulerError, SchedulerResult};
pub use job::{Job, JobConfig, JobContext};
pub use scheduler::{JobScheduler, JobStatus};
