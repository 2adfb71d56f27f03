use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use prx_db::StoreError;
use prx_srs::{RecallItem, Scheduler, Status};
use uuid::Uuid;

use super::model::{
    CreateItemRequest, RecallItemView, RecallSummary, ReviewRequest, StatusCounts, SubjectSummary,
};
use crate::{
    error::ApiError, metrics, normalization::grouping_key, state::ApiState,
    validation::validate_label,
};

/// A review that loses a write race is re-applied once against the latest snapshot.
const REVIEW_ATTEMPTS: u32 = 2;

pub async fn create_item(
    state: &ApiState,
    learner_id: Uuid,
    request: &CreateItemRequest,
) -> Result<RecallItem, ApiError> {
    let subject = validate_label("subject", &request.subject)?;
    let topic = validate_label("topic", &request.topic)?;
    let question_ref = validate_label("question_ref", &request.question_ref)?;

    let item = state.scheduler.new_item(
        Uuid::new_v4(),
        learner_id,
        subject,
        topic,
        question_ref,
        Utc::now(),
    );

    match state.store.insert(&item).await {
        Ok(()) => {}
        Err(StoreError::AlreadyExists) => {
            let existing = state
                .store
                .find_by_question(learner_id, &item.question_ref)
                .await?;
            return Err(ApiError::Conflict(match existing {
                Some(existing) => format!(
                    "question '{}' is already tracked for this learner as item {}",
                    existing.question_ref, existing.id
                ),
                None => format!("question '{}' is already tracked", item.question_ref),
            }));
        }
        Err(err) => return Err(err.into()),
    }

    tracing::info!(
        %learner_id,
        item_id = %item.id,
        subject = %item.subject,
        question_ref = %item.question_ref,
        "Recall item created"
    );

    Ok(item)
}

/// Fetch an item, treating items of other learners as missing.
pub async fn load_item(
    state: &ApiState,
    learner_id: Uuid,
    item_id: Uuid,
) -> Result<RecallItem, ApiError> {
    match state.store.get(item_id).await? {
        Some(item) if item.learner_id == learner_id => Ok(item),
        _ => Err(ApiError::NotFound(format!("recall item {item_id}"))),
    }
}

pub async fn review_item(
    state: &ApiState,
    learner_id: Uuid,
    item_id: Uuid,
    request: &ReviewRequest,
) -> Result<RecallItem, ApiError> {
    let mut attempt = 1;

    loop {
        let current = load_item(state, learner_id, item_id).await?;
        let outcome = request.to_outcome(&current)?;
        let reviewed = state
            .scheduler
            .record_review(&current, outcome, Utc::now())?;

        match state.store.update(current.last_attempted_at, &reviewed).await {
            Ok(()) => {
                let status = state.scheduler.classify(&reviewed, reviewed.last_attempted_at);
                metrics::record_review_event(outcome.quality, status, reviewed.interval_days);
                tracing::info!(
                    %learner_id,
                    %item_id,
                    quality = %outcome.quality,
                    repetitions = reviewed.repetitions,
                    interval_days = reviewed.interval_days,
                    ease_factor = reviewed.ease_factor,
                    %status,
                    "Review recorded"
                );
                return Ok(reviewed);
            }
            Err(StoreError::ConcurrentModification(_)) if attempt < REVIEW_ATTEMPTS => {
                metrics::record_store_conflict(true);
                tracing::debug!(%item_id, attempt, "Review raced another write, re-applying");
                attempt += 1;
            }
            Err(StoreError::ConcurrentModification(id)) => {
                metrics::record_store_conflict(false);
                return Err(ApiError::Conflict(format!(
                    "recall item {id} changed during review, submit the review again"
                )));
            }
            Err(err) => return Err(err.into()),
        }
    }
}

pub async fn list_items(
    state: &ApiState,
    learner_id: Uuid,
    status: Option<Status>,
) -> Result<Vec<RecallItemView>, ApiError> {
    let now = Utc::now();
    let items = state.store.list_for_learner(learner_id).await?;

    Ok(items
        .into_iter()
        .map(|item| RecallItemView::new(&state.scheduler, item, now))
        .filter(|view| status.is_none_or(|wanted| view.status == wanted))
        .collect())
}

pub async fn due_items(
    state: &ApiState,
    learner_id: Uuid,
) -> Result<Vec<RecallItemView>, ApiError> {
    let now = Utc::now();
    let items = state.store.list_for_learner(learner_id).await?;

    Ok(state
        .scheduler
        .due_queue(&items, now)
        .map(|item| RecallItemView::new(&state.scheduler, item.clone(), now))
        .collect())
}

pub async fn summary(state: &ApiState, learner_id: Uuid) -> Result<RecallSummary, ApiError> {
    let items = state.store.list_for_learner(learner_id).await?;
    Ok(summarize(&state.scheduler, &items, Utc::now()))
}

#[derive(Default)]
struct Tally {
    label: String,
    counts: StatusCounts,
    retention_sum: u64,
}

impl Tally {
    fn add(&mut self, status: Status, retention: u8) {
        self.counts.add(status);
        self.retention_sum += u64::from(retention);
    }

    fn average_retention(&self) -> f64 {
        average(self.retention_sum, self.counts.total())
    }
}

fn average(sum: u64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let mean = sum as f64 / count as f64;
    (mean * 10.0).round() / 10.0
}

/// Per-status counts and retention, overall and per subject.
pub fn summarize(scheduler: &Scheduler, items: &[RecallItem], now: DateTime<Utc>) -> RecallSummary {
    let mut overall = Tally::default();
    let mut subjects: BTreeMap<String, Tally> = BTreeMap::new();
    let mut next_review_at: Option<DateTime<Utc>> = None;

    for item in items {
        let status = scheduler.classify(item, now);
        let retention = scheduler.retention_strength(item);

        overall.add(status, retention);
        subjects
            .entry(grouping_key(&item.subject))
            .or_insert_with(|| Tally {
                label: item.subject.clone(),
                ..Default::default()
            })
            .add(status, retention);

        if status != Status::Due {
            next_review_at = Some(match next_review_at {
                Some(earliest) => earliest.min(item.next_review_at),
                None => item.next_review_at,
            });
        }
    }

    RecallSummary {
        total: overall.counts.total(),
        counts: overall.counts,
        average_retention: overall.average_retention(),
        next_review_at,
        subjects: subjects
            .into_values()
            .map(|tally| SubjectSummary {
                total: tally.counts.total(),
                average_retention: tally.average_retention(),
                subject: tally.label,
                counts: tally.counts,
            })
            .collect(),
    }
}
