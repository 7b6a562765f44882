use crate::advisory::{AdvisoryService, AssistantQueryRequest, ChatRequest, SuggestRequest};
use crate::error::{AppError, Result};
use crate::metrics::ADVISORY_REQUEST_DURATION_SECONDS;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// JSON-over-HTTP advisory client
///
/// One attempt per call; timeouts are enforced by the underlying client and
/// there is no retry loop.
#[derive(Clone)]
pub struct HttpAdvisoryClient {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpAdvisoryClient {
    /// Create a new advisory client
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `payload` to `path` and decode the body as JSON
    async fn post_json<T: Serialize + Sync>(
        &self,
        operation: &str,
        path: &str,
        payload: &T,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let timer = ADVISORY_REQUEST_DURATION_SECONDS
            .with_label_values(&[operation])
            .start_timer();

        let response = self
            .client
            .post(&url)
            .header("User-Agent", concat!("incident-copilot/", env!("CARGO_PKG_VERSION")))
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::AdvisoryUnavailable(format!(
                        "request timed out after {} seconds",
                        self.timeout_secs
                    ))
                } else if e.is_connect() {
                    AppError::AdvisoryUnavailable(format!("failed to connect: {}", e))
                } else {
                    AppError::AdvisoryUnavailable(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            timer.observe_duration();
            return Err(AppError::AdvisoryUnavailable(format!(
                "{} returned {}: {}",
                path,
                status.as_u16(),
                if body.is_empty() { "<no-body>" } else { body.as_str() }
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| AppError::AdvisoryUnavailable(format!("malformed response: {}", e)));
        timer.observe_duration();

        debug!(url = %url, ok = body.is_ok(), "Advisory call completed");
        body
    }
}

#[async_trait]
impl AdvisoryService for HttpAdvisoryClient {
    async fn suggest(&self, request: &SuggestRequest) -> Result<Value> {
        self.post_json("suggest", "/incident-suggest", request).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<Value> {
        self.post_json("chat", "/incident-chat", request).await
    }

    async fn assistant_query(&self, request: &AssistantQueryRequest) -> Result<Value> {
        self.post_json("assistant", "/assistant/query", request).await
    }
}
