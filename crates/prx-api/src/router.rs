use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri},
    middleware,
    routing::get,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::{
    error::ApiError,
    metrics,
    middleware::{cors::create_cors_layer, request_id::request_id_middleware},
    recall,
    state::ApiState,
};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .merge(recall::routes())
        .fallback(handler_404)
}

/// The routes with CORS, HTTP tracing, request metrics and request ids.
///
/// `/metrics` is served only when an exporter handle is given.
pub fn app(
    state: ApiState,
    allowed_origins: Vec<String>,
    metrics_handle: Option<PrometheusHandle>,
) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let mut app = router().with_state(state);
    if let Some(handle) = metrics_handle {
        app = app.merge(
            Router::new()
                .route("/metrics", get(metrics::metrics_handler))
                .with_state(handle),
        );
    }

    app.layer(create_cors_layer(allowed_origins))
        .layer(trace_layer)
        .layer(middleware::from_fn(metrics::track_metrics))
        .layer(middleware::from_fn(request_id_middleware))
}

/// Liveness
async fn health() -> StatusCode {
    StatusCode::OK
}

/// Readiness: the item store answers.
async fn ready(State(state): State<ApiState>) -> Result<StatusCode, ApiError> {
    let backend = state.store.backend_tag();
    if let Err(err) = state.store.ping().await {
        tracing::error!(backend, error = %err, "Readiness check failed");
        return Err(ApiError::Unavailable(format!("{backend} store is not reachable")));
    }
    Ok(StatusCode::OK)
}

async fn handler_404(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("no resource at {}", uri.path()))
}
