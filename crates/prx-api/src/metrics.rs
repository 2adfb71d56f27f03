//! Prometheus metrics for request traffic and review activity.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use prx_srs::{Quality, Status};

/// Path label for requests that matched no route.
pub const UNMATCHED_PATH: &str = "unmatched";

/// Initialize Prometheus metrics exporter
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
        )?
        .set_buckets_for_metric(
            Matcher::Full("recall_review_interval_days".to_string()),
            &[1.0, 3.0, 7.0, 14.0, 30.0, 60.0, 120.0, 365.0],
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Middleware to record HTTP request metrics
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = route_label(&req);

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path,
        "status" => status
    )
    .record(duration);

    response
}

/// Route template such as `/learners/{learner_id}/recall/due`, so ids and
/// unknown paths never become label values.
fn route_label(req: &Request) -> String {
    req.extensions()
        .get::<MatchedPath>()
        .map_or_else(|| UNMATCHED_PATH.to_string(), |path| path.as_str().to_string())
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (StatusCode::OK, handle.render())
}

/// Record a scheduled review and the bucket the item landed in.
pub fn record_review_event(quality: Quality, status: Status, interval_days: u32) {
    counter!(
        "recall_reviews_total",
        "quality" => quality.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!("recall_review_interval_days").record(f64::from(interval_days));
}

/// Record a review write rejected because the item changed underneath it.
pub fn record_store_conflict(retried: bool) {
    counter!(
        "recall_store_conflicts_total",
        "retried" => retried.to_string()
    )
    .increment(1);
}
