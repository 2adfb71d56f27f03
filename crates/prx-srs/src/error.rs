use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned by the scheduler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulerError {
    /// The review happened before the item's last recorded attempt.
    #[error("review at {now} precedes last attempt at {last_attempted_at}")]
    InvalidTimestamp {
        now: DateTime<Utc>,
        last_attempted_at: DateTime<Utc>,
    },
    #[error("invalid review outcome: {0}")]
    InvalidOutcome(String),
    /// `now + interval` does not fit in a timestamp.
    #[error("next review date overflows for interval of {interval_days} days")]
    ScheduleOverflow { interval_days: u32 },
    #[error("invalid scheduler configuration: {0}")]
    InvalidConfig(String),
}
