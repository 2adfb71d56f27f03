use std::time::Duration;

use chrono::{DateTime, Utc};
use prx_srs::{Quality, RecallItem, ReviewOutcome, Scheduler, Status};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateItemRequest {
    pub subject: String,
    pub topic: String,
    pub question_ref: String,
}

/// Body of a review submission.
///
/// Either an explicit `quality` (0-3) or a raw `correct` flag must be given.
/// A raw flag is graded against the item's historical response time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewRequest {
    pub quality: Option<u8>,
    pub correct: Option<bool>,
    pub response_ms: Option<u64>,
    pub accuracy_percent: Option<u8>,
}

impl ReviewRequest {
    pub fn to_outcome(&self, item: &RecallItem) -> Result<ReviewOutcome, ApiError> {
        let quality = match (self.quality, self.correct) {
            (Some(quality), _) => Quality::try_from(quality)?,
            (None, Some(correct)) => match self.response_ms {
                Some(ms) => Quality::from_response(
                    correct,
                    Duration::from_millis(ms),
                    item.average_response(),
                ),
                None => Quality::from_response(correct, Duration::ZERO, None),
            },
            (None, None) => {
                return Err(ApiError::Unprocessable(
                    "review must include either quality or correct".to_string(),
                ));
            }
        };

        Ok(ReviewOutcome {
            quality,
            accuracy_percent: self.accuracy_percent,
            response_ms: self.response_ms,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemsQuery {
    pub status: Option<String>,
}

/// Item as returned by the API, with its derived fields computed at request time.
#[derive(Debug, Clone, Serialize)]
pub struct RecallItemView {
    #[serde(flatten)]
    pub item: RecallItem,
    pub status: Status,
    pub retention_strength: u8,
}

impl RecallItemView {
    pub fn new(scheduler: &Scheduler, item: RecallItem, now: DateTime<Utc>) -> Self {
        Self {
            status: scheduler.classify(&item, now),
            retention_strength: scheduler.retention_strength(&item),
            item,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub due: usize,
    pub upcoming: usize,
    pub learning: usize,
    pub mastered: usize,
}

impl StatusCounts {
    pub const fn add(&mut self, status: Status) {
        match status {
            Status::Due => self.due += 1,
            Status::Upcoming => self.upcoming += 1,
            Status::Learning => self.learning += 1,
            Status::Mastered => self.mastered += 1,
        }
    }

    pub const fn total(&self) -> usize {
        self.due + self.upcoming + self.learning + self.mastered
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectSummary {
    /// Label as first seen for this subject
    pub subject: String,
    pub total: usize,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub average_retention: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecallSummary {
    pub total: usize,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub average_retention: f64,
    /// Earliest review still in the future, if any
    pub next_review_at: Option<DateTime<Utc>>,
    pub subjects: Vec<SubjectSummary>,
}
