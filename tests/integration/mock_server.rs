//! Mock HTTP server setup for integration tests

use galileo_harness::{GalileoClient, HarnessConfig, PollStrategy};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const API_KEY: &str = "test-api-key";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    pub fn config(&self) -> HarnessConfig {
        HarnessConfig::new("https://api.galileo.invalid", API_KEY)
            .with_project("demo")
            .with_log_stream("dev")
            .with_openai("sk-test", self.base_url.clone())
            .with_http_timeout(Duration::from_secs(5))
    }

    /// Short polling budget so timeouts resolve quickly.
    pub fn fast_poll() -> PollStrategy {
        PollStrategy::fixed(Duration::from_millis(20), Duration::from_millis(200))
    }

    /// Create a test client pointed at the mock server without a login call.
    ///
    /// This uses the base_url_override feature to inject the mock server URL.
    pub async fn create_test_client(&self) -> galileo_harness::Result<GalileoClient> {
        GalileoClient::builder(self.config())
            .base_url_override(&self.base_url)
            .authenticate(false)
            .poll_strategy(Self::fast_poll())
            .build()
            .await
    }

    /// Create a test client that exchanges the API key at build time.
    pub async fn create_authenticated_client(&self) -> galileo_harness::Result<GalileoClient> {
        GalileoClient::builder(self.config())
            .base_url_override(&self.base_url)
            .poll_strategy(Self::fast_poll())
            .build()
            .await
    }

    /// Create a mock answering `method path` with a JSON body.
    pub async fn mock_json(&self, method: &str, path: &str, status: usize, body: Value) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    /// Like [`Self::mock_json`], ignoring any query string.
    pub async fn mock_json_any_query(
        &self,
        method: &str,
        path: &str,
        status: usize,
        body: Value,
    ) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(method, path)
            .match_query(Matcher::Any)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    /// Create a mock for an error response
    pub async fn mock_error_response(&self, method: &str, path: &str, status: usize, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(method, path)
            .match_query(Matcher::Any)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// A mock that must never be hit.
    pub async fn mock_untouched(&self, method: &str, path: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(method, path)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("{}")
            .expect(0)
            .create_async()
            .await
    }
}
