use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::RecallItemRow;

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<RecallItemRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, learner_id, subject, topic, question_ref,
                last_attempted_at, next_review_at, interval_days, ease_factor, repetitions,
                accuracy_percent, total_reviews, response_samples, response_mean_ms
            FROM recall_items
            WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn find_by_question<'e, E>(
    executor: E,
    learner_id: Uuid,
    question_ref: &str,
) -> Result<Option<RecallItemRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, learner_id, subject, topic, question_ref,
                last_attempted_at, next_review_at, interval_days, ease_factor, repetitions,
                accuracy_percent, total_reviews, response_samples, response_mean_ms
            FROM recall_items
            WHERE learner_id = $1 AND question_ref = $2
        "#,
    )
    .bind(learner_id)
    .bind(question_ref)
    .fetch_optional(executor)
    .await
}

pub async fn list_for_learner<'e, E>(
    executor: E,
    learner_id: Uuid,
) -> Result<Vec<RecallItemRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, learner_id, subject, topic, question_ref,
                last_attempted_at, next_review_at, interval_days, ease_factor, repetitions,
                accuracy_percent, total_reviews, response_samples, response_mean_ms
            FROM recall_items
            WHERE learner_id = $1
            ORDER BY id
        "#,
    )
    .bind(learner_id)
    .fetch_all(executor)
    .await
}

pub async fn insert<'e, E>(executor: E, row: &RecallItemRow) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO recall_items (
                id, learner_id, subject, topic, question_ref,
                last_attempted_at, next_review_at, interval_days, ease_factor, repetitions,
                accuracy_percent, total_reviews, response_samples, response_mean_ms
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(row.id)
    .bind(row.learner_id)
    .bind(&row.subject)
    .bind(&row.topic)
    .bind(&row.question_ref)
    .bind(row.last_attempted_at)
    .bind(row.next_review_at)
    .bind(row.interval_days)
    .bind(row.ease_factor)
    .bind(row.repetitions)
    .bind(row.accuracy_percent)
    .bind(row.total_reviews)
    .bind(row.response_samples)
    .bind(row.response_mean_ms)
    .execute(executor)
    .await?;
    Ok(())
}

/// Compare-and-set write of the schedule columns.
///
/// Only applies when the persisted `last_attempted_at` still equals
/// `expected_last_attempted_at` and the new snapshot is not older than it.
/// Returns whether a row was written.
pub async fn update_schedule<'e, E>(
    executor: E,
    expected_last_attempted_at: DateTime<Utc>,
    row: &RecallItemRow,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE recall_items
            SET last_attempted_at = $3,
                next_review_at = $4,
                interval_days = $5,
                ease_factor = $6,
                repetitions = $7,
                accuracy_percent = $8,
                total_reviews = $9,
                response_samples = $10,
                response_mean_ms = $11,
                updated_at = NOW()
            WHERE id = $1
                AND last_attempted_at = $2
                AND $3 >= last_attempted_at
        "#,
    )
    .bind(row.id)
    .bind(expected_last_attempted_at)
    .bind(row.last_attempted_at)
    .bind(row.next_review_at)
    .bind(row.interval_days)
    .bind(row.ease_factor)
    .bind(row.repetitions)
    .bind(row.accuracy_percent)
    .bind(row.total_reviews)
    .bind(row.response_samples)
    .bind(row.response_mean_ms)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn exists<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT EXISTS(SELECT 1 FROM recall_items WHERE id = $1)
        "#,
    )
    .bind(id)
    .fetch_one(executor)
    .await
}
