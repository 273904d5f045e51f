//! CORS wiring
//!
//! The allow-list semantics live in [`crate::services::origin`]; this
//! module connects them to the HTTP layer twice. The [`CorsLayer`] decides
//! which responses carry allow headers (browsers enforce the block), and
//! [`origin_gate`] rejects disallowed cross-origin requests outright so
//! non-browser callers see an explicit error status instead of a normal
//! response with missing headers.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::AppState;
use crate::error::AppError;
use crate::metrics;
use crate::services::origin::OriginRules;

/// Build the CORS layer from compiled origin rules.
pub fn cors_layer(rules: Arc<OriginRules>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            rules.is_allowed(origin.to_str().ok())
        }))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-admin-secret"),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400))
}

/// Reject requests whose `Origin` is not on the allow-list.
///
/// Same-origin and non-browser requests carry no `Origin` header and pass
/// through untouched.
pub async fn origin_gate(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());

    if !state.origin_rules.is_allowed(origin) {
        tracing::warn!(origin = ?origin, path = %req.uri().path(), "Origin not on the allow-list");
        metrics::record_cors_denied();
        return AppError::CorsDenied.into_response();
    }

    next.run(req).await
}
