use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::{config::AppConfig, models::ChatMessage};

/// AssistantError
///
/// Failures from the external chat service. Handlers collapse these to a
/// generic internal error; the detail is only for server-side logs.
#[derive(Debug, thiserror::Error)]
#[error("assistant request failed: {0}")]
pub struct AssistantError(pub String);

/// AssistantService
///
/// Narrow contract for the coordinator assistant feature: a message history
/// in, an opaque reply out. The service is entirely stateless from this
/// side; conversation memory lives with the caller.
#[async_trait]
pub trait AssistantService: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AssistantError>;
}

/// AssistantState
///
/// The concrete type used to share the assistant client across the
/// application state.
pub type AssistantState = Arc<dyn AssistantService>;

#[derive(Deserialize)]
struct AssistantResponse {
    reply: String,
}

/// HttpAssistantClient
///
/// Implementation posting the message list to the configured chat endpoint.
#[derive(Clone)]
pub struct HttpAssistantClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HttpAssistantClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.assistant_endpoint.clone(),
            api_key: config.assistant_api_key.clone(),
            model: config.assistant_model.clone(),
        }
    }
}

#[async_trait]
impl AssistantService for HttpAssistantClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AssistantError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": messages,
            }))
            .send()
            .await
            .map_err(|e| AssistantError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AssistantError(response.status().to_string()));
        }

        let parsed = response
            .json::<AssistantResponse>()
            .await
            .map_err(|e| AssistantError(e.to_string()))?;

        Ok(parsed.reply)
    }
}

/// MockAssistantService
///
/// Test double returning a canned reply, or failing on request.
#[derive(Clone, Default)]
pub struct MockAssistantService {
    pub should_fail: bool,
}

impl MockAssistantService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

#[async_trait]
impl AssistantService for MockAssistantService {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AssistantError> {
        if self.should_fail {
            return Err(AssistantError("mock failure".to_string()));
        }
        let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
        Ok(format!("mock reply to: {}", last))
    }
}
