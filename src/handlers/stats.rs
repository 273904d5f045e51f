//! Visit counter and click-analytics handlers

use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::AppState;
use crate::error::{AppError, AppResult};
use crate::models::TrackRequest;
use crate::services::store;

/// Bump and return the visit counter
///
/// GET /api/ping
pub async fn ping(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let visits = state
        .store
        .increment(store::VISITS_KEY)
        .await
        .map_err(AppError::Stat)?;

    Ok(Json(json!({ "ok": true, "visits": visits })))
}

/// Record a click event
///
/// POST /api/track
///
/// Best effort: a store failure is logged, never surfaced to the client.
pub async fn track(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TrackRequest>,
) -> Json<Value> {
    let doc = json!({
        "action": body.action,
        "label": body.label,
    });

    if let Err(e) = state.store.insert(store::EVENTS, doc).await {
        tracing::warn!("Failed to record analytics event: {}", e);
    }

    Json(json!({ "ok": true }))
}
