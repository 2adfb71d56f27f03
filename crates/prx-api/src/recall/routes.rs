use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use prx_srs::Status;
use uuid::Uuid;

use super::{
    model::{CreateItemRequest, ItemsQuery, RecallItemView, RecallSummary, ReviewRequest},
    service,
};
use crate::{ApiState, error::ApiError};

// Extractors whose rejections render as `ApiError`
type ApiPath<T> = WithRejection<Path<T>, ApiError>;
type ApiJson<T> = WithRejection<Json<T>, ApiError>;
type ApiQuery<T> = WithRejection<Query<T>, ApiError>;

/// Create the recall routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route(
            "/learners/{learner_id}/recall/items",
            get(list_items).post(create_item),
        )
        .route("/learners/{learner_id}/recall/items/{item_id}", get(get_item))
        .route(
            "/learners/{learner_id}/recall/items/{item_id}/reviews",
            post(submit_review),
        )
        .route("/learners/{learner_id}/recall/due", get(due_queue))
        .route("/learners/{learner_id}/recall/summary", get(summary))
}

async fn create_item(
    State(state): State<ApiState>,
    WithRejection(Path(learner_id), _): ApiPath<Uuid>,
    WithRejection(Json(payload), _): ApiJson<CreateItemRequest>,
) -> Result<(StatusCode, Json<RecallItemView>), ApiError> {
    let item = service::create_item(&state, learner_id, &payload).await?;
    let view = RecallItemView::new(&state.scheduler, item, Utc::now());
    Ok((StatusCode::CREATED, Json(view)))
}

async fn list_items(
    State(state): State<ApiState>,
    WithRejection(Path(learner_id), _): ApiPath<Uuid>,
    WithRejection(Query(query), _): ApiQuery<ItemsQuery>,
) -> Result<Json<Vec<RecallItemView>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<Status>)
        .transpose()
        .map_err(ApiError::Validation)?;

    Ok(Json(service::list_items(&state, learner_id, status).await?))
}

async fn get_item(
    State(state): State<ApiState>,
    WithRejection(Path((learner_id, item_id)), _): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<RecallItemView>, ApiError> {
    let item = service::load_item(&state, learner_id, item_id).await?;
    Ok(Json(RecallItemView::new(&state.scheduler, item, Utc::now())))
}

async fn submit_review(
    State(state): State<ApiState>,
    WithRejection(Path((learner_id, item_id)), _): ApiPath<(Uuid, Uuid)>,
    WithRejection(Json(payload), _): ApiJson<ReviewRequest>,
) -> Result<Json<RecallItemView>, ApiError> {
    let item = service::review_item(&state, learner_id, item_id, &payload).await?;
    Ok(Json(RecallItemView::new(&state.scheduler, item, Utc::now())))
}

async fn due_queue(
    State(state): State<ApiState>,
    WithRejection(Path(learner_id), _): ApiPath<Uuid>,
) -> Result<Json<Vec<RecallItemView>>, ApiError> {
    Ok(Json(service::due_items(&state, learner_id).await?))
}

async fn summary(
    State(state): State<ApiState>,
    WithRejection(Path(learner_id), _): ApiPath<Uuid>,
) -> Result<Json<RecallSummary>, ApiError> {
    Ok(Json(service::summary(&state, learner_id).await?))
}
