//! # Cron Expression Handling
//!
//! Parsing and human-readable description of the standard 5-field cron
//! expressions carried in [`JobConfig::schedule`](super::job::JobConfig).
//!
//! The `cron` crate works on 6/7-field expressions with a leading seconds
//! field; job schedules use the conventional 5-field form, so parsing
//! validates the field count and pins the seconds field to `0` before
//! handing off. A job therefore fires at most once per matching minute.

use std::str::FromStr;

use chrono::Utc;
use cron::Schedule;

use super::errors::SchedulerError;

/// Parse a standard 5-field cron expression.
pub fn parse_schedule(expression: &str) -> Result<Schedule, SchedulerError> {
    let field_count = expression.split_whitespace().count();
    if field_count != 5 {
        return Err(SchedulerError::invalid_schedule(
            expression,
            format!("expected 5 whitespace-separated cron fields, found {field_count}"),
        ));
    }

    let with_seconds = format!("0 {expression}");
    Schedule::from_str(&with_seconds)
        .map_err(|cause| SchedulerError::invalid_schedule(expression, cause.to_string()))
}

/// Derive a human-readable cadence description from the cron fields.
///
/// Recognizes the common shapes — fixed minute every hour, fixed time daily,
/// fixed time weekly, every N hours — and falls back to the raw expression
/// for anything else. The fixed-time forms include the next occurrence's
/// time of day for observability.
pub fn describe_schedule(expression: &str, schedule: &Schedule) -> String {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    let [minute, hour, day_of_month, month, day_of_week] = fields.as_slice() else {
        return expression.to_string();
    };

    let time_of_next_run = schedule
        .upcoming(Utc)
        .next()
        .map(|next| next.format("%H:%M:%S UTC").to_string())
        .unwrap_or_default();

    if *hour == "*" && *day_of_month == "*" && *month == "*" && *day_of_week == "*" {
        format!("every hour at minute {minute}")
    } else if let Some((_, step)) = hour.split_once('/') {
        format!("every {step} hours at minute {minute}")
    } else if *day_of_month == "*" && *month == "*" && *day_of_week == "*" {
        format!("daily at {time_of_next_run}")
    } else if *day_of_week != "*" && *day_of_month == "*" {
        format!("weekly at {time_of_next_run}")
    } else {
        expression.to_string()
    }
}
