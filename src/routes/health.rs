//! Health and service-info routes

use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::models::HealthResponse;

/// Service banner
///
/// GET /
pub async fn root() -> impl IntoResponse {
    Json(HealthResponse {
        ok: true,
        service: "portfolio-api".to_string(),
    })
}

/// Browsers ask for this constantly; answer without hitting the API.
///
/// GET /favicon.ico
pub async fn favicon() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
