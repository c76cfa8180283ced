use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::ApiResponse;

/// ApiError
///
/// The complete failure taxonomy for request handling. Every handler returns
/// `Result<_, ApiError>` and lets `?` carry failures to this single boundary,
/// where each variant maps to a status code and the standard response
/// envelope. Internal causes are logged server-side and never serialized.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No token, an unverifiable token, or an account that is no longer
    /// active. The reason tag is machine-readable and deliberately coarse.
    #[error("unauthenticated: {0}")]
    Unauthenticated(&'static str),

    /// Authenticated, but the role gate rejected the request. Ownership
    /// mismatches are surfaced as `NotFound` instead, so existence is not
    /// leaked through the status code.
    #[error("forbidden")]
    Forbidden,

    /// Missing or malformed request fields, or an invalid enum target value.
    #[error("{0}")]
    InvalidInput(String),

    /// The resource does not exist, or is not visible to this identity.
    #[error("not found")]
    NotFound,

    /// Unexpected persistence or gateway failure. The cause has already been
    /// logged where it occurred.
    #[error("internal error")]
    Internal,
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("database error: {:?}", e);
        ApiError::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthenticated(reason) => (
                StatusCode::UNAUTHORIZED,
                ApiResponse::<()>::failure("Authentication required", Some(reason.to_string())),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                ApiResponse::<()>::failure("Forbidden", None),
            ),
            ApiError::InvalidInput(msg) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::<()>::failure(msg, None),
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                ApiResponse::<()>::failure("Not found", None),
            ),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::<()>::failure(
                    "Request failed",
                    Some("Internal server error".to_string()),
                ),
            ),
        };
        (status, Json(body)).into_response()
    }
}
