//! # Configuration
//!
//! Typed configuration for the coordination core, loaded the same way the
//! rest of the stack loads component configuration: serde-deserialized
//! structs with defaults, layered from an optional file plus
//! environment-variable overrides via the `config` crate.
//!
//! ## Sources
//!
//! [`CoordinationConfig::load`] merges, in order of increasing precedence:
//!
//! 1. built-in defaults,
//! 2. an optional configuration file (TOML/YAML/JSON by extension),
//! 3. environment variables prefixed with `CONDUCTOR`, using `__` as the
//!    nesting separator (e.g. `CONDUCTOR__SCHEDULER__MAX_CONCURRENT_JOBS=10`).
//!
//! ## Usage
//!
//! ```rust
//! use conductor_core::config::CoordinationConfig;
//!
//! let config = CoordinationConfig::load(None).unwrap();
//! assert_eq!(config.scheduler.max_concurrent_jobs, 5);
//! assert_eq!(config.scheduler.default_max_retries, 3);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Log level for tunable observability signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Message bus tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Level at which publishing into a type tag with no subscribers is
    /// reported. Publishing to an unlistened tag is allowed; intentionally
    /// optional events can turn the signal down without losing it.
    pub unhandled_message_level: LogLevel,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            unhandled_message_level: LogLevel::Warn,
        }
    }
}

/// Job scheduler tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Global ceiling on concurrently running jobs, counted across all job
    /// names. A trigger arriving at the ceiling is skipped, not queued.
    pub max_concurrent_jobs: usize,

    /// Retry ceiling per execution: a failing job is attempted this many
    /// times in total before the execution is reported as failed.
    pub default_max_retries: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 5,
            default_max_retries: 3,
        }
    }
}

/// Top-level configuration for a coordination core instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinationConfig {
    pub bus: BusConfig,
    pub scheduler: SchedulerConfig,
}

impl CoordinationConfig {
    /// Load configuration from an optional file plus `CONDUCTOR`-prefixed
    /// environment variables, over the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix("CONDUCTOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: Self = settings.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.max_concurrent_jobs == 0 {
            return Err(ConfigError::invalid(
                "scheduler.max_concurrent_jobs",
                "must be at least 1",
            ));
        }
        if self.scheduler.default_max_retries == 0 {
            return Err(ConfigError::invalid(
                "scheduler.default_max_retries",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = CoordinationConfig::default();
        assert_eq!(config.scheduler.max_concurrent_jobs, 5);
        assert_eq!(config.scheduler.default_max_retries, 3);
        assert_eq!(config.bus.unhandled_message_level, LogLevel::Warn);
    }

    #[test]
    fn load_without_sources_yields_defaults() {
        let config = CoordinationConfig::load(None).unwrap();
        assert_eq!(config, CoordinationConfig::default());
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "[scheduler]\nmax_concurrent_jobs = 8\n\n[bus]\nunhandled_message_level = \"debug\""
        )
        .unwrap();

        let config = CoordinationConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.scheduler.max_concurrent_jobs, 8);
        assert_eq!(config.scheduler.default_max_retries, 3);
        assert_eq!(config.bus.unhandled_message_level, LogLevel::Debug);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "[scheduler]\nmax_concurrent_jobs = 0").unwrap();

        let error = CoordinationConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(error, ConfigError::Invalid { .. }));
    }
}
