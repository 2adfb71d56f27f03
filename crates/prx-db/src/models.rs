use chrono::{DateTime, Utc};
use prx_srs::{RecallItem, ResponseTiming};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::StoreError;

/// Row of the `recall_items` table
///
/// Unsigned scheduler fields are stored in signed Postgres integers; the
/// table's CHECK constraints keep them in range.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecallItemRow {
    pub id: Uuid,
    pub learner_id: Uuid,
    pub subject: String,
    pub topic: String,
    pub question_ref: String,
    pub last_attempted_at: DateTime<Utc>,
    pub next_review_at: DateTime<Utc>,
    pub interval_days: i32,
    pub ease_factor: f64,
    pub repetitions: i32,
    /// SMALLINT, 0-100
    pub accuracy_percent: Option<i16>,
    pub total_reviews: i32,
    /// Both timing columns are NULL or both are set
    pub response_samples: Option<i32>,
    pub response_mean_ms: Option<i64>,
}

fn column<T, U>(name: &str, value: T) -> Result<U, StoreError>
where
    U: TryFrom<T>,
    T: Copy + std::fmt::Display,
{
    U::try_from(value).map_err(|_| StoreError::Corrupt(format!("{name} out of range: {value}")))
}

impl TryFrom<RecallItemRow> for RecallItem {
    type Error = StoreError;

    fn try_from(row: RecallItemRow) -> Result<Self, Self::Error> {
        let response_timing = match (row.response_samples, row.response_mean_ms) {
            (Some(samples), Some(mean_ms)) => Some(ResponseTiming {
                samples: column("response_samples", samples)?,
                mean_ms: column("response_mean_ms", mean_ms)?,
            }),
            (None, None) => None,
            _ => {
                return Err(StoreError::Corrupt(format!(
                    "recall item {} has partial response timing",
                    row.id
                )));
            }
        };

        Ok(Self {
            id: row.id,
            learner_id: row.learner_id,
            subject: row.subject,
            topic: row.topic,
            question_ref: row.question_ref,
            last_attempted_at: row.last_attempted_at,
            next_review_at: row.next_review_at,
            interval_days: column("interval_days", row.interval_days)?,
            ease_factor: row.ease_factor,
            repetitions: column("repetitions", row.repetitions)?,
            accuracy_percent: row
                .accuracy_percent
                .map(|value| column("accuracy_percent", value))
                .transpose()?,
            total_reviews: column("total_reviews", row.total_reviews)?,
            response_timing,
        })
    }
}

impl TryFrom<&RecallItem> for RecallItemRow {
    type Error = StoreError;

    fn try_from(item: &RecallItem) -> Result<Self, Self::Error> {
        Ok(Self {
            id: item.id,
            learner_id: item.learner_id,
            subject: item.subject.clone(),
            topic: item.topic.clone(),
            question_ref: item.question_ref.clone(),
            last_attempted_at: item.last_attempted_at,
            next_review_at: item.next_review_at,
            interval_days: column("interval_days", item.interval_days)?,
            ease_factor: item.ease_factor,
            repetitions: column("repetitions", item.repetitions)?,
            accuracy_percent: item.accuracy_percent.map(i16::from),
            total_reviews: column("total_reviews", item.total_reviews)?,
            response_samples: item
                .response_timing
                .map(|timing| column("response_samples", timing.samples))
                .transpose()?,
            response_mean_ms: item
                .response_timing
                .map(|timing| column("response_mean_ms", timing.mean_ms))
                .transpose()?,
        })
    }
}
