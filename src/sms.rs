use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::AppConfig;

/// SmsError
///
/// Failures an SMS send can produce. Transport errors and gateway rejections
/// are distinguished so bulk sends can report something useful per item.
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    #[error("gateway request failed: {0}")]
    Transport(String),
    #[error("gateway rejected message: {0}")]
    Rejected(String),
}

/// SmsGateway
///
/// Narrow contract for the outbound SMS provider. `send` returns the
/// gateway-assigned message id, which is the correlation key for later
/// delivery reports.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send(&self, recipient: &str, body: &str) -> Result<String, SmsError>;
}

/// SmsState
///
/// The concrete type used to share the gateway client across the
/// application state.
pub type SmsState = Arc<dyn SmsGateway>;

#[derive(Deserialize)]
struct GatewayResponse {
    message_id: String,
}

/// HttpSmsGateway
///
/// Implementation posting to the provider's HTTP API. One request per
/// message; the caller owns batching and per-item error reporting.
#[derive(Clone)]
pub struct HttpSmsGateway {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    sender_id: String,
}

impl HttpSmsGateway {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.sms_endpoint.clone(),
            api_key: config.sms_api_key.clone(),
            sender_id: config.sms_sender_id.clone(),
        }
    }
}

#[async_trait]
impl SmsGateway for HttpSmsGateway {
    async fn send(&self, recipient: &str, body: &str) -> Result<String, SmsError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({
                "to": recipient,
                "message": body,
                "sender": self.sender_id,
            }))
            .send()
            .await
            .map_err(|e| SmsError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SmsError::Rejected(response.status().to_string()));
        }

        let parsed = response
            .json::<GatewayResponse>()
            .await
            .map_err(|e| SmsError::Transport(e.to_string()))?;

        Ok(parsed.message_id)
    }
}

/// MockSmsGateway
///
/// Test double. Fails every send when `should_fail` is set, or selectively
/// for recipients listed in `fail_for`, which is what bulk-send tests use to
/// exercise per-item error reporting.
#[derive(Clone, Default)]
pub struct MockSmsGateway {
    pub should_fail: bool,
    pub fail_for: Vec<String>,
}

impl MockSmsGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            fail_for: vec![],
        }
    }
}

#[async_trait]
impl SmsGateway for MockSmsGateway {
    async fn send(&self, recipient: &str, _body: &str) -> Result<String, SmsError> {
        if self.should_fail || self.fail_for.iter().any(|r| r == recipient) {
            return Err(SmsError::Rejected("mock rejection".to_string()));
        }
        Ok(format!("mock-{}", recipient))
    }
}
