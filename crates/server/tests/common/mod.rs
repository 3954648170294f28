//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that builds the router in-process
//! with an in-memory order store and a scripted fulfillment client.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use orderflow_core::{
    testing::MockFulfillmentClient, Config, InMemoryEntityLock, InMemoryOrderStore, LockConfig,
    LockCoordinator, OrderOrchestrator, OrderStore,
};
use orderflow_server::state::AppState;

/// Re-export fixtures for test convenience
pub use orderflow_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_order_creation() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/api/v1/orders/o1", json!({
///         "items": [{ "product_id": "p1", "amount": 2 }]
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Order store behind the orchestrator - seed or inspect orders
    pub store: Arc<InMemoryOrderStore>,
    /// Mock fulfillment client - script submission outcomes
    pub fulfillment: Arc<MockFulfillmentClient>,
    /// Entity lock - hold keys to provoke timeouts
    pub lock: Arc<InMemoryEntityLock>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a test fixture whose lock gives up quickly.
    pub fn with_fast_lock() -> Self {
        let mut config = Config::default();
        config.lock = LockConfig {
            timeout_ms: 200,
            poll_interval_ms: 20,
        };
        Self::with_config(config)
    }

    /// Create a test fixture with custom configuration.
    pub fn with_config(mut config: Config) -> Self {
        config.lifecycle.retry_delay_ms = 10;

        let store = Arc::new(InMemoryOrderStore::new());
        let fulfillment = Arc::new(MockFulfillmentClient::new());
        let lock = Arc::new(InMemoryEntityLock::new());

        let orchestrator = OrderOrchestrator::new(
            config.lifecycle.clone(),
            Arc::clone(&store) as Arc<dyn OrderStore>,
            LockCoordinator::new(lock.clone(), config.lock.clone()),
            fulfillment.clone(),
        );

        let state = Arc::new(AppState::new(config, Arc::new(orchestrator)));
        let router = orderflow_server::api::create_router(state);

        Self {
            router,
            store,
            fulfillment,
            lock,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a GET request and return the raw text body.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let (status, bytes) = self.send(request).await;
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        let (status, body_bytes) = self.send(request).await;

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, body_bytes.to_vec())
    }
}

/// Build a create-order request body from `(product_id, amount)` pairs.
pub fn items_body(pairs: &[(&str, i32)]) -> Value {
    let items: Vec<Value> = pairs
        .iter()
        .map(|(product_id, amount)| {
            serde_json::json!({ "product_id": product_id, "amount": amount })
        })
        .collect();
    serde_json::json!({ "items": items })
}
