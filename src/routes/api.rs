//! API Routes
//!
//! Defines the routing structure for the portfolio API:
//! - Public reads (projects, journal, visit counter)
//! - Contact-form writes (rate limited)
//! - Admin writes (secret gated)
//! - Analytics writes (best effort)
//! - Mail debug endpoints

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::config::AppState;
use crate::handlers::{admin, contact, content, stats};
use crate::middleware::{admin_auth, contact_rate_limit};

/// Create the `/api` router
pub fn create_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let admin_routes = Router::new()
        .route("/seed", post(admin::seed))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth));

    let debug_routes = Router::new()
        .route("/mail", get(admin::mail_verify))
        .route("/mail/send", get(admin::mail_test_send));

    Router::new()
        .route("/ping", get(stats::ping))
        .route("/track", post(stats::track))
        .route("/projects", get(content::list_projects))
        .route("/blogs", get(content::list_posts))
        .route(
            "/blogs",
            post(content::create_post)
                .layer(middleware::from_fn_with_state(state.clone(), admin_auth)),
        )
        .route(
            "/messages",
            post(contact::submit)
                .layer(middleware::from_fn_with_state(state, contact_rate_limit)),
        )
        .nest("/admin", admin_routes)
        .nest("/_debug", debug_routes)
}
