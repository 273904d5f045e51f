//! Project gallery and journal handlers

use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::AppState;
use crate::error::{AppError, AppResult};
use crate::models::JournalPostRequest;
use crate::services::store;

/// List projects, newest first
///
/// GET /api/projects
pub async fn list_projects(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Value>>> {
    let items = state.store.list_desc(store::PROJECTS).await?;
    Ok(Json(items))
}

/// List journal posts, newest first
///
/// GET /api/blogs
pub async fn list_posts(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Value>>> {
    let items = state.store.list_desc(store::POSTS).await?;
    Ok(Json(items))
}

/// Create a journal post (admin only)
///
/// POST /api/blogs
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(body): Json<JournalPostRequest>,
) -> AppResult<Json<Value>> {
    if body.title.trim().is_empty() || body.content.trim().is_empty() {
        return Err(AppError::BadRequest("title_content_required"));
    }

    let id = state
        .store
        .insert(
            store::POSTS,
            json!({
                "title": body.title,
                "content": body.content,
                "tags": body.tags,
            }),
        )
        .await?;

    Ok(Json(json!({ "ok": true, "id": id })))
}
