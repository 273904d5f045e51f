//! Admin and mail-debug handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::AppState;
use crate::error::AppResult;
use crate::services::mailer::Envelope;
use crate::services::store;

/// Wipe and reseed the project and journal collections (admin only)
///
/// POST /api/admin/seed
pub async fn seed(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    state.store.clear(store::PROJECTS).await?;
    state.store.clear(store::POSTS).await?;

    state
        .store
        .insert(
            store::PROJECTS,
            json!({
                "title": "Spark SQL Workshop",
                "summary": "3-hour live session on joins & KPIs using Spark SQL.",
                "tech": ["Spark", "PySpark", "SQL", "React"],
                "github": "https://github.com/yourname/spark-sql-workshop",
                "cover": "https://images.unsplash.com/photo-1531297484001-80022131f5a1",
                "impact": "Helped 60+ students; 90% positive feedback.",
            }),
        )
        .await?;

    state
        .store
        .insert(
            store::POSTS,
            json!({
                "title": "Shipping the first version of this site",
                "content": "Ship v1, then iterate.",
                "tags": ["meta"],
            }),
        )
        .await?;

    Ok(Json(json!({ "ok": true })))
}

/// Mail provider connectivity check
///
/// GET /api/_debug/mail
pub async fn mail_verify(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.mailer.verify().await {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false, "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// One-shot test email to the owner
///
/// GET /api/_debug/mail/send
pub async fn mail_test_send(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let envelope = Envelope {
        to: state.config.mail.owner_email.clone(),
        reply_to: None,
        subject: "Test email from the portfolio API".to_string(),
        text: "If you see this, sending works.".to_string(),
    };

    match state.mailer.send(&envelope).await {
        Ok(id) => Json(json!({ "ok": true, "messageId": id.0 })).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false, "error": e.to_string() })),
        )
            .into_response(),
    }
}
