//! Common test utilities for in-process API testing.
//!
//! The fixture wires the real router, ledger and filesystem writer to a
//! `MockResolver`, with the media and log roots in a temporary directory.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use rdfin_core::{
    testing::{MockResolver, MockStrmWriter},
    Config, DayLedger, FsLedgerStore, IngestConfig, IngestOrchestrator, Materializer,
    RetryConfig,
};

/// Re-export fixtures for test convenience
pub use rdfin_core::testing::fixtures;

/// Test fixture for API testing with a mock provider.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_add_movie() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/movies", json!({
///         "links": "https://real-debrid.com/d/a | Arrival"
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock provider - script per-link responses
    pub resolver: Arc<MockResolver>,
    /// Filesystem writer with injectable failures
    pub writer: Arc<MockStrmWriter>,
    /// Holds the media and log roots
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let media_root = temp_dir.path().join("media");
        let log_root = temp_dir.path().join("logs");

        let mut config = Config::default();
        config.server.host = std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST);
        config.debrid.api_token = "test-token".to_string();
        config.debrid.retry = RetryConfig::none();
        config.library.media_root = media_root.clone();
        config.library.log_root = log_root.clone();
        config.ingest = IngestConfig::default().with_max_concurrent_links(2);

        let resolver = Arc::new(MockResolver::new());
        let writer = Arc::new(MockStrmWriter::new(&media_root));

        let materializer = Arc::new(Materializer::new(
            Arc::clone(&resolver) as Arc<dyn rdfin_core::LinkResolver>,
            Arc::clone(&writer) as Arc<dyn rdfin_core::StrmWriter>,
            config.debrid.retry.clone(),
        ));
        let ledger = Arc::new(DayLedger::new(
            Arc::new(FsLedgerStore::new(&log_root)),
            materializer,
        ));
        let orchestrator = Arc::new(IngestOrchestrator::new(ledger, config.ingest.clone()));

        let state = Arc::new(rdfin_server::state::AppState::new(config, orchestrator));
        let router = rdfin_server::api::create_router(state);

        Self {
            router,
            resolver,
            writer,
            temp_dir,
        }
    }

    pub fn media_root(&self) -> PathBuf {
        self.temp_dir.path().join("media")
    }

    pub fn log_root(&self) -> PathBuf {
        self.temp_dir.path().join("logs")
    }

    /// Contents of a `.strm` file relative to the media root.
    pub fn read_strm(&self, relative: impl AsRef<Path>) -> Option<String> {
        std::fs::read_to_string(self.media_root().join(relative)).ok()
    }

    /// Today's date as used in log URLs.
    pub fn today() -> String {
        chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
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

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with a url-encoded form body.
    pub async fn post_form(&self, path: &str, body: &str) -> TestResponse {
        self.request_raw("POST", path, body, "application/x-www-form-urlencoded")
            .await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        self.request_raw("POST", path, body, "application/json").await
    }

    /// Send a GET request and return the raw body as text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn request_raw(
        &self,
        method: &str,
        path: &str,
        body: &str,
        content_type: &str,
    ) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
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

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
