//! Boundary to the out-of-process advisory assistant.
//!
//! The service is optional and untrusted: every response is handled as raw
//! JSON and validated field by field by the caller. Failures surface as
//! [`AppError::AdvisoryUnavailable`](crate::error::AppError) and are absorbed
//! by the suggestion engine and the advisor.

mod http;
mod types;

pub use http::HttpAdvisoryClient;
pub use types::{AssistantIncident, AssistantQueryRequest, ChatRequest, SuggestRequest};

use crate::config::AdvisoryConfig;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Out-of-process assistant used for suggestion overrides and chat
#[async_trait]
pub trait AdvisoryService: Send + Sync {
    /// Classification override; every response field is optional
    async fn suggest(&self, request: &SuggestRequest) -> Result<Value>;

    /// Conversational reply about one incident
    async fn chat(&self, request: &ChatRequest) -> Result<Value>;

    /// Free-form question over recent incidents
    async fn assistant_query(&self, request: &AssistantQueryRequest) -> Result<Value>;
}

/// Build the advisory client described by `config`, or `None` when disabled
pub fn create_advisory(config: &AdvisoryConfig) -> Result<Option<Arc<dyn AdvisoryService>>> {
    if !config.enabled {
        tracing::info!("Advisory service disabled, heuristics only");
        return Ok(None);
    }

    tracing::info!(base_url = %config.base_url, "Initializing advisory client");
    let client = HttpAdvisoryClient::new(&config.base_url, config.timeout_secs)?;
    Ok(Some(Arc::new(client)))
}
