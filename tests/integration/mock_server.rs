//! Mock HTTP server setup for integration tests

use mockito::{Matcher, Mock, Server, ServerGuard};
use nature_remo_controller::{ControllerConfig, NatureRemoApi};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const TOKEN: &str = "test-token";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    pub fn config(&self) -> ControllerConfig {
        ControllerConfig {
            token: Some(TOKEN.to_string()),
            base_url: self.base_url.clone(),
            admission_poll_interval_ms: 10,
            repeat_interval_ms: 20,
            ..Default::default()
        }
    }

    pub fn api(&self) -> NatureRemoApi {
        NatureRemoApi::new(&self.config(), TOKEN).expect("build api")
    }

    /// Unix epoch `secs` from now, as the reset header carries it.
    pub fn reset_in(secs: u64) -> String {
        (SystemTime::now() + Duration::from_secs(secs))
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            .to_string()
    }

    /// Create a mock for a successful JSON GET carrying rate-limit headers
    pub async fn mock_get(&mut self, path: &str, remaining: u64, body: &str) -> Mock {
        self.server
            .mock("GET", path)
            .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-rate-limit-limit", "30")
            .with_header("x-rate-limit-remaining", &remaining.to_string())
            .with_header("x-rate-limit-reset", &Self::reset_in(300))
            .with_body(body)
            .create_async()
            .await
    }

    /// Create a mock for a POST, optionally matching an urlencoded form field
    pub async fn mock_post(
        &mut self,
        path: &str,
        form: Option<(&str, &str)>,
        status: usize,
        remaining: u64,
    ) -> Mock {
        let body_matcher = match form {
            Some((k, v)) => Matcher::UrlEncoded(k.to_string(), v.to_string()),
            None => Matcher::Any,
        };
        self.server
            .mock("POST", path)
            .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
            .match_body(body_matcher)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_header("x-rate-limit-limit", "30")
            .with_header("x-rate-limit-remaining", &remaining.to_string())
            .with_header("x-rate-limit-reset", &Self::reset_in(300))
            .with_body("{}")
            .create_async()
            .await
    }
}
