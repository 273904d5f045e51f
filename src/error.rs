//! Error types and handling for the Portfolio API
//!
//! Provides a unified error type that converts to appropriate HTTP responses.
//! Error bodies carry a stable machine-readable `error` code and nothing
//! else, so clients can match on them without parsing prose.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::store::StoreError;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed payload; carries the error code returned to the client.
    #[error("Bad request: {0}")]
    BadRequest(&'static str),

    /// Admin secret missing or mismatched.
    #[error("Unauthorized")]
    Unauthorized,

    /// Request origin is not on the allow-list.
    #[error("Origin not allowed")]
    CorsDenied,

    /// Rate budget exceeded; `retry_after` is the remaining window in seconds.
    #[error("Rate limit exceeded, retry after {retry_after}s")]
    Throttled { retry_after: u64 },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Visit counter update failed; kept separate so the client sees the
    /// same `stat_error` code the endpoint has always returned.
    #[error("Stat error: {0}")]
    Stat(StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::BadRequest(code) => (StatusCode::BAD_REQUEST, *code),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::CorsDenied => (StatusCode::FORBIDDEN, "cors_denied"),
            AppError::Throttled { .. } => (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded"),
            AppError::Store(e) => {
                tracing::error!("Store error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "store_error")
            }
            AppError::Stat(e) => {
                tracing::error!("Counter update failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "stat_error")
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let body = Json(json!({ "error": code }));

        match self {
            AppError::Throttled { retry_after } => {
                (status, [("Retry-After", retry_after.to_string())], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn throttled_response_carries_retry_after() {
        let response = AppError::Throttled { retry_after: 42 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get("Retry-After").unwrap().to_str().unwrap(),
            "42"
        );
    }

    #[tokio::test]
    async fn unauthorized_body_is_the_bare_code() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "unauthorized" }));
    }
}
