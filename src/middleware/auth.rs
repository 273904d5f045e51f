//! Admin authorization middleware
//!
//! Privileged write endpoints are protected by a single shared secret
//! carried in the `X-Admin-Secret` header. The comparison is an exact
//! match; absence or mismatch terminates the request before any handler
//! runs, so no store write or mail call can happen first.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::config::AppState;
use crate::error::AppError;

/// Header carrying the admin secret.
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Admin gate middleware
pub async fn admin_auth(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let secret = state.config.admin.secret.as_str();
    let provided = req
        .headers()
        .get(ADMIN_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());

    // An unset secret must not let an absent header through.
    if secret.is_empty() || provided != Some(secret) {
        tracing::warn!(path = %req.uri().path(), "Admin secret missing or mismatched");
        return AppError::Unauthorized.into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::services::mailer::NoopMailer;
    use crate::services::store::MemStore;
    use axum::http::StatusCode;
    use axum::{routing::post, Router};
    use tower::ServiceExt;

    fn state_with_secret(secret: &str) -> Arc<AppState> {
        let mut config = AppConfig::default();
        config.admin.secret = secret.to_string();
        Arc::new(AppState::with_collaborators(
            config,
            Arc::new(MemStore::new()),
            Arc::new(NoopMailer),
        ))
    }

    async fn protected() -> &'static str {
        "granted"
    }

    fn app(state: Arc<AppState>) -> Router {
        Router::new().route(
            "/admin",
            post(protected).layer(axum::middleware::from_fn_with_state(state, admin_auth)),
        )
    }

    fn request(secret: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/admin");
        if let Some(secret) = secret {
            builder = builder.header("X-Admin-Secret", secret);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn matching_secret_is_allowed() {
        let response = app(state_with_secret("sesame"))
            .oneshot(request(Some("sesame")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_secret_is_unauthorized() {
        let response = app(state_with_secret("sesame"))
            .oneshot(request(Some("wrong")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "unauthorized" }));
    }

    #[tokio::test]
    async fn absent_header_is_unauthorized() {
        let response = app(state_with_secret("sesame"))
            .oneshot(request(None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unset_secret_rejects_everything() {
        let response = app(state_with_secret(""))
            .oneshot(request(Some("")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
