use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::DEFAULT_INITIAL_EASE;

/// Running mean of the response times recorded for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseTiming {
    pub samples: u32,
    pub mean_ms: u64,
}

impl ResponseTiming {
    /// Fold one more observation into the mean.
    pub fn record(previous: Option<Self>, response_ms: u64) -> Self {
        match previous {
            None => Self {
                samples: 1,
                mean_ms: response_ms,
            },
            Some(timing) => {
                let samples = timing.samples.saturating_add(1);
                let total = u128::from(timing.mean_ms) * u128::from(timing.samples)
                    + u128::from(response_ms);
                let mean = total / u128::from(samples);
                Self {
                    samples,
                    mean_ms: u64::try_from(mean).unwrap_or(u64::MAX),
                }
            }
        }
    }

    pub const fn mean(&self) -> Duration {
        Duration::from_millis(self.mean_ms)
    }
}

/// A (learner, question) pair the learner periodically revisits.
///
/// Snapshots are immutable from the scheduler's point of view: reviewing an
/// item yields a new `RecallItem` for the store to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecallItem {
    pub id: Uuid,
    pub learner_id: Uuid,
    pub subject: String,
    pub topic: String,
    pub question_ref: String,
    pub last_attempted_at: DateTime<Utc>,
    pub next_review_at: DateTime<Utc>,
    /// Always at least 1.
    pub interval_days: u32,
    pub ease_factor: f64,
    /// Consecutive passing reviews since the last failure.
    pub repetitions: u32,
    pub accuracy_percent: Option<u8>,
    pub total_reviews: u32,
    pub response_timing: Option<ResponseTiming>,
}

impl RecallItem {
    /// A never-reviewed item, due immediately.
    pub fn new(
        id: Uuid,
        learner_id: Uuid,
        subject: impl Into<String>,
        topic: impl Into<String>,
        question_ref: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            learner_id,
            subject: subject.into(),
            topic: topic.into(),
            question_ref: question_ref.into(),
            last_attempted_at: now,
            next_review_at: now,
            interval_days: 1,
            ease_factor: DEFAULT_INITIAL_EASE,
            repetitions: 0,
            accuracy_percent: None,
            total_reviews: 0,
            response_timing: None,
        }
    }

    /// Historical mean response time, if any review carried one.
    pub fn average_response(&self) -> Option<Duration> {
        self.response_timing.as_ref().map(ResponseTiming::mean)
    }
}
