//! Portfolio API server
//!
//! REST backend for a personal portfolio site: journal posts, contact
//! messages with email notification, visit counters, and click analytics,
//! all behind a CORS / admin-secret / rate-limit gating layer.
//!
//! The browser front end communicates only with this API; persistence and
//! outbound mail sit behind trait seams in [`portfolio_api::services`].

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portfolio_api::config::{AppConfig, AppState};
use portfolio_api::{metrics, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting portfolio API v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let app_config = AppConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    tracing::info!(
        host = %app_config.server.host,
        port = app_config.server.port,
        "Configuration loaded"
    );

    // Initialize application state
    let state = Arc::new(AppState::new(app_config).await?);

    metrics::register_metrics();
    state.rate_limit.clone().start_sweep_task();

    // Build the router
    let app = routes::app(state.clone());

    // Start the server
    let addr = SocketAddr::from((
        state
            .config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .unwrap_or([127, 0, 0, 1].into()),
        state.config.server.port,
    ));

    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    state.store.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
