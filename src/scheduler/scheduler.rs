//! # Job Scheduler
//!
//! Owns the set of registered jobs, runs one recurring timer task per enabled
//! job from its cron expression, enforces a global concurrency ceiling plus
//! per-job mutual exclusion, and retries failed executions with exponential
//! backoff.
//!
//! ## Execution model
//!
//! Every cron tick (and every startup run) is a detached task whose failure
//! is caught and logged at the fire-and-forget boundary — an exhausted retry
//! ceiling never crashes the scheduler or the host process. A trigger that
//! arrives while the global ceiling is reached, or while the same job is
//! still running, is skipped outright rather than queued.
//!
//! The running set is released through a drop guard, so the slot is returned
//! on every exit path including panics. Backoff waits race against the
//! shutdown signal, so `stop` aborts pending retries instead of leaving them
//! stranded.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use conductor_core::config::SchedulerConfig;
//! use conductor_core::scheduler::{Job, JobConfig, JobContext, JobScheduler};
//!
//! struct NightlyCleanup {
//!     config: JobConfig,
//! }
//!
//! #[async_trait]
//! impl Job for NightlyCleanup {
//!     fn config(&self) -> &JobConfig {
//!         &self.config
//!     }
//!
//!     async fn execute(&self, _context: &JobContext) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let scheduler = JobScheduler::new(SchedulerConfig::default());
//! scheduler.register_job(Arc::new(NightlyCleanup {
//!     config: JobConfig::new("nightly-cleanup", "0 2 * * *").run_on_startup(true),
//! }));
//! scheduler.start();
//! // ... process lifetime ...
//! scheduler.stop();
//! # }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use cron::Schedule;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::SchedulerConfig;

use super::cron::{describe_schedule, parse_schedule};
use super::errors::{SchedulerError, SchedulerResult};
use super::job::{Job, JobContext};

/// A job plus the stable id assigned when it entered the registry. The id is
/// reused for every execution of the job.
#[derive(Clone)]
struct RegisteredJob {
    id: Uuid,
    job: Arc<dyn Job>,
}

/// Observational snapshot of one job's scheduler-side state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobStatus {
    pub registered: bool,
    pub running: bool,
    pub enabled: bool,
}

/// Cron-driven scheduler with bounded concurrency and automatic retry.
pub struct JobScheduler {
    config: SchedulerConfig,
    jobs: RwLock<HashMap<String, RegisteredJob>>,
    timers: Mutex<HashMap<String, JoinHandle<()>>>,
    running: Arc<Mutex<HashSet<String>>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl JobScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            config,
            jobs: RwLock::new(HashMap::new()),
            timers: Mutex::new(HashMap::new()),
            running: Arc::new(Mutex::new(HashSet::new())),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Register a job under its configured name.
    ///
    /// A duplicate name is rejected with a warning, not an error; the first
    /// registration wins. Must be called before [`start`](Self::start) for
    /// the job to be picked up.
    pub fn register_job(&self, job: Arc<dyn Job>) {
        let job_name = job.config().name.clone();
        let mut jobs = self.jobs.write();
        if jobs.contains_key(&job_name) {
            warn!(job = %job_name, "job already registered");
            return;
        }
        jobs.insert(
            job_name.clone(),
            RegisteredJob {
                id: Uuid::new_v4(),
                job,
            },
        );
        info!(job = %job_name, "job registered");
    }

    /// Start one recurring timer per enabled registered job.
    ///
    /// Jobs flagged `run_on_startup` fire one immediate detached execution.
    /// A job whose cron expression fails to parse is logged and skipped;
    /// scheduling of the remaining jobs continues. Must be called from
    /// within a Tokio runtime.
    pub fn start(&self) {
        info!("starting job scheduler");

        let jobs: Vec<RegisteredJob> = self.jobs.read().values().cloned().collect();
        let mut scheduled: Vec<(String, String)> = Vec::new();

        for entry in jobs {
            let job_config = entry.job.config().clone();

            if !job_config.enabled {
                debug!(job = %job_config.name, "job disabled");
                continue;
            }

            if job_config.run_on_startup {
                self.spawn_execution(entry.clone(), "startup");
            }

            match parse_schedule(&job_config.schedule) {
                Ok(schedule) => {
                    let cadence = describe_schedule(&job_config.schedule, &schedule);
                    let handle = tokio::spawn(timer_loop(
                        schedule,
                        entry,
                        Arc::clone(&self.running),
                        self.config,
                        self.shutdown_rx.clone(),
                    ));
                    self.timers.lock().insert(job_config.name.clone(), handle);
                    info!(job = %job_config.name, cadence = %cadence, "job scheduled");
                    scheduled.push((job_config.name, cadence));
                }
                Err(cause) => {
                    error!(job = %job_config.name, error = %cause, "failed to schedule job");
                }
            }
        }

        if scheduled.is_empty() {
            warn!("no jobs scheduled");
        } else {
            info!(count = scheduled.len(), "active scheduled jobs:");
            for (job_name, cadence) in &scheduled {
                info!("   {job_name}: {cadence}");
            }
        }

        info!("job scheduler started");
    }

    /// Cancel every active timer and clear the timer table.
    ///
    /// In-flight executions are left to drain; pending backoff waits are
    /// aborted through the shutdown signal.
    pub fn stop(&self) {
        info!("stopping job scheduler");
        let _ = self.shutdown_tx.send(true);

        let mut timers = self.timers.lock();
        for (job_name, handle) in timers.drain() {
            handle.abort();
            debug!(job = %job_name, "job timer stopped");
        }

        info!("job scheduler stopped");
    }

    /// Observational status for one job name. No side effects.
    pub fn job_status(&self, job_name: &str) -> JobStatus {
        let jobs = self.jobs.read();
        let entry = jobs.get(job_name);
        JobStatus {
            registered: entry.is_some(),
            running: self.running.lock().contains(job_name),
            enabled: entry.is_some_and(|entry| entry.job.config().enabled),
        }
    }

    /// Observational status for every registered job.
    pub fn all_jobs_status(&self) -> HashMap<String, JobStatus> {
        let job_names: Vec<String> = self.jobs.read().keys().cloned().collect();
        job_names
            .into_iter()
            .map(|job_name| {
                let status = self.job_status(&job_name);
                (job_name, status)
            })
            .collect()
    }

    /// The stable id assigned to a registered job, if any.
    pub fn job_id(&self, job_name: &str) -> Option<Uuid> {
        self.jobs.read().get(job_name).map(|entry| entry.id)
    }

    /// Names of jobs with an active timer.
    pub fn scheduled_job_names(&self) -> Vec<String> {
        self.timers.lock().keys().cloned().collect()
    }

    fn spawn_execution(&self, entry: RegisteredJob, trigger: &'static str) {
        let running = Arc::clone(&self.running);
        let config = self.config;
        let shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            if let Err(cause) = run_job(entry, running, config, shutdown).await {
                error!(trigger, error = %cause, "job execution failed");
            }
        });
    }
}

/// Recurring timer for one job: sleeps until each upcoming cron occurrence
/// and fires a detached execution per tick. Successive occurrences are
/// computed strictly after the previous one, so a boundary never fires twice.
async fn timer_loop(
    schedule: Schedule,
    entry: RegisteredJob,
    running: Arc<Mutex<HashSet<String>>>,
    config: SchedulerConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    let job_name = entry.job.config().name.clone();
    let mut after = Utc::now();

    loop {
        let Some(next) = schedule.after(&after).next() else {
            warn!(job = %job_name, "cron schedule has no further occurrences");
            return;
        };
        let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);

        tokio::select! {
            () = tokio::time::sleep(wait) => {
                after = next;
                let entry = entry.clone();
                let running = Arc::clone(&running);
                let shutdown = shutdown.clone();
                tokio::spawn(async move {
                    if let Err(cause) = run_job(entry, running, config, shutdown).await {
                        error!(trigger = "cron", error = %cause, "job execution failed");
                    }
                });
            }
            _ = shutdown.changed() => {
                debug!(job = %job_name, "job timer cancelled");
                return;
            }
        }
    }
}

/// Releases a job's running-set slot when dropped, so cleanup happens on
/// every exit path including panics.
struct RunningSlot {
    running: Arc<Mutex<HashSet<String>>>,
    job_name: String,
}

impl Drop for RunningSlot {
    fn drop(&mut self) {
        self.running.lock().remove(&self.job_name);
    }
}

/// One admission-controlled, retrying execution of a job.
///
/// Admission control and mutual exclusion are decided in a single critical
/// section on the running set. The retry loop builds a fresh [`JobContext`]
/// per attempt and backs off `2^attempt` seconds between attempts on a
/// cancellable timer.
async fn run_job(
    entry: RegisteredJob,
    running: Arc<Mutex<HashSet<String>>>,
    config: SchedulerConfig,
    mut shutdown: watch::Receiver<bool>,
) -> SchedulerResult<()> {
    let job_name = entry.job.config().name.clone();

    let _slot = {
        let mut guard = running.lock();
        if guard.len() >= config.max_concurrent_jobs {
            warn!(
                job = %job_name,
                running = guard.len(),
                ceiling = config.max_concurrent_jobs,
                "concurrency ceiling reached, trigger skipped"
            );
            return Ok(());
        }
        if !guard.insert(job_name.clone()) {
            warn!(job = %job_name, "job already running, trigger skipped");
            return Ok(());
        }
        RunningSlot {
            running: Arc::clone(&running),
            job_name: job_name.clone(),
        }
    };

    let started = tokio::time::Instant::now();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let context = JobContext {
            job_id: entry.id,
            job_name: job_name.clone(),
            started_at: Utc::now(),
            attempt,
            max_retries: config.default_max_retries,
        };

        match entry.job.execute(&context).await {
            Ok(()) => {
                info!(
                    job = %job_name,
                    duration_ms = started.elapsed().as_millis() as u64,
                    attempt,
                    "job executed successfully"
                );
                return Ok(());
            }
            Err(cause) if attempt < config.default_max_retries => {
                let delay = Duration::from_secs(2u64.pow(attempt));
                warn!(
                    job = %job_name,
                    attempt,
                    next_retry_secs = delay.as_secs(),
                    error = ?cause,
                    "job attempt failed, retrying"
                );
                tokio::select! {
                    () = tokio::time::sleep(delay) => {}
                    _ = shutdown.changed() => {
                        info!(job = %job_name, attempt, "shutdown during backoff, pending retry aborted");
                        return Err(SchedulerError::retry_aborted(job_name, attempt));
                    }
                }
            }
            Err(cause) => {
                error!(
                    job = %job_name,
                    duration_ms = started.elapsed().as_millis() as u64,
                    attempts = attempt,
                    error = ?cause,
                    "job execution failed after exhausting retries"
                );
                return Err(SchedulerError::job_failed(job_name, attempt));
            }
        }
    }
}
