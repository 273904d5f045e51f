//! Route definitions
//!
//! [`app`] assembles the full router. Gating order for a request travelling
//! inward: the CORS layer decides which responses carry allow headers, the
//! origin gate rejects disallowed cross-origin requests, and the per-route
//! gates protect admin and contact writes.

pub mod api;
pub mod health;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppState;
use crate::metrics;
use crate::middleware::{cors_layer, origin_gate};

/// Build the complete application router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/favicon.ico", get(health::favicon))
        .route("/metrics", get(metrics::metrics_handler))
        .nest("/api", api::create_router(state.clone()))
        .layer(middleware::from_fn_with_state(state.clone(), origin_gate))
        .layer(middleware::from_fn(metrics::track_metrics))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors_layer(state.origin_rules.clone()))
        .with_state(state)
}
