use axum::Json;
use serde::{Deserialize, Serialize};

/// ApiResponse
///
/// The uniform response envelope every endpoint returns:
/// `{success, data?, message?, error?}`. Success responses carry `data`
/// (and occasionally a human-readable `message`); failures carry `message`
/// and, for internal errors, a generic `error` tag. Absent fields are omitted
/// from the JSON output entirely.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response carrying a payload.
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        })
    }

    /// Successful response carrying a payload and a human-readable note.
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
        })
    }

    /// Failure envelope. Used by the error boundary; handlers normally go
    /// through `ApiError` instead of constructing this directly.
    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            error,
        }
    }
}

impl ApiResponse<()> {
    /// Successful response with no payload, only a confirmation message.
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
        })
    }
}
