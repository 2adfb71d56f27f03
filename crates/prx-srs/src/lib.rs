//! SRS (Spaced Repetition System) core for Praxis Recall
//!
//! This crate decides when a learner should next revisit a question and
//! which display bucket (`due`, `upcoming`, `learning`, `mastered`) each item
//! falls into. It performs no I/O and holds no state: reviewing an item
//! returns a new snapshot which the caller is responsible for persisting.
//!
//! # Algorithm
//!
//! Grades are `q ∈ {0, 1, 2, 3}`. A failing grade (`q = 0`) resets the streak
//! and the interval to one day and lowers the ease factor by 0.2. A passing
//! grade extends the streak, adjusts the ease factor by
//! `0.1 - (3 - q) * (0.08 + (3 - q) * 0.02)` and sets the interval to 1 day,
//! then 6 days, then `round(previous interval * ease)`. The ease factor never
//! drops below 1.3.
//!
//! The free functions in this module use the default policy; build a
//! [`Scheduler`] to tune it.

pub mod config;
pub mod error;
pub mod item;
pub mod outcome;
pub mod scheduler;
pub mod status;

use chrono::{DateTime, Utc};

pub use config::SchedulerConfig;
pub use error::SchedulerError;
pub use item::{RecallItem, ResponseTiming};
pub use outcome::{Quality, ReviewOutcome};
pub use scheduler::Scheduler;
pub use status::Status;

/// Apply one review with the default policy.
///
/// See [`Scheduler::record_review`].
pub fn record_review(
    item: &RecallItem,
    outcome: impl Into<ReviewOutcome>,
    now: DateTime<Utc>,
) -> Result<RecallItem, SchedulerError> {
    Scheduler::default().record_review(item, outcome, now)
}

/// Classify an item with the default mastery thresholds.
pub fn classify(item: &RecallItem, now: DateTime<Utc>) -> Status {
    Scheduler::default().classify(item, now)
}

/// `min(100, round(ease_factor * repetitions * 10))`
pub fn retention_strength(item: &RecallItem) -> u8 {
    Scheduler::default().retention_strength(item)
}

/// Due items, most overdue first, ties broken by ascending id.
pub fn due_queue<'a, I>(items: I, now: DateTime<Utc>) -> std::vec::IntoIter<&'a RecallItem>
where
    I: IntoIterator<Item = &'a RecallItem>,
{
    Scheduler::default().due_queue(items, now)
}
