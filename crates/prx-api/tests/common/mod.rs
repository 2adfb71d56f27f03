use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use http_body_util::BodyExt;
use prx_api::{router, state::ApiState};
use prx_db::{MemoryRecallStore, RecallStore};
use prx_srs::Scheduler;
use serde::Deserialize;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

/// Origin allowed by the CORS layer in layered clients
pub const TEST_ORIGIN: &str = "http://localhost:5173";

/// Test state builder over an in-memory store
pub struct TestStateBuilder {
    store: Arc<dyn RecallStore>,
    scheduler: Scheduler,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryRecallStore::new()),
            scheduler: Scheduler::default(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn RecallStore>) -> Self {
        self.store = store;
        self
    }

    pub fn build(self) -> ApiState {
        ApiState::new(self.store, self.scheduler)
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper to make requests to the test app
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Client over the bare routes with the given state
    pub fn for_state(state: ApiState) -> Self {
        Self::new(router::router().with_state(state))
    }

    /// Client over the routes with the production middleware stack
    pub fn layered(state: ApiState) -> Self {
        Self::new(router::app(state, vec![TEST_ORIGIN.to_string()], None))
    }

    /// Send a request and get the response
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            body: body_bytes.to_vec(),
            headers,
        }
    }

    /// Send a GET request
    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");

        self.request(request).await
    }

    /// Send a POST request with JSON body
    pub async fn post_json<T: serde::Serialize>(&self, uri: &str, body: &T) -> TestResponse {
        let json_body = serde_json::to_string(body).expect("Failed to serialize body");

        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json_body))
            .expect("Failed to build request");

        self.request(request).await
    }

    /// Create a recall item and return its id
    pub async fn create_item(&self, learner_id: Uuid, subject: &str, question_ref: &str) -> Uuid {
        let response = self
            .post_json(
                &format!("/learners/{learner_id}/recall/items"),
                &json!({
                    "subject": subject,
                    "topic": "General",
                    "question_ref": question_ref,
                }),
            )
            .await;
        response.assert_status(StatusCode::CREATED);

        let body: Value = response.json();
        body["id"]
            .as_str()
            .and_then(|id| id.parse().ok())
            .expect("Created item should have an id")
    }

    /// Submit a review with an explicit quality
    pub async fn review(&self, learner_id: Uuid, item_id: Uuid, quality: u8) -> TestResponse {
        self.post_json(
            &format!("/learners/{learner_id}/recall/items/{item_id}/reviews"),
            &json!({ "quality": quality }),
        )
        .await
    }
}

/// Test response wrapper
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub headers: HeaderMap,
}

impl TestResponse {
    /// Parse response body as JSON
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> T {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "Failed to parse JSON: {e}, body: {}",
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    /// Response header as a string, if present
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get response body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Assert status code
    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
    }
}
