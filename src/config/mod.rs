//! Configuration module for the Portfolio API
//!
//! Handles loading configuration from environment variables and config
//! files, and builds the shared application state from it.

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::middleware::{RateLimitConfig, RateLimitState};
use crate::services::mailer::{HttpMailer, Mailer, NoopMailer};
use crate::services::origin::OriginRules;
use crate::services::store::{DocumentStore, MemStore, PgStore};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// CORS allow-list
    pub cors: CorsConfig,
    /// Document store configuration
    pub database: DatabaseConfig,
    /// Contact rate limiting
    pub rate_limit: RateLimitSettings,
    /// Admin gate
    pub admin: AdminConfig,
    /// Outbound mail
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Comma-separated allowed origins; entries may contain `*` globs.
    pub allowed_origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: "http://localhost:5173,http://127.0.0.1:5173".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Postgres connection URL; empty selects the in-memory store.
    pub url: String,
    /// Connection pool size
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Fixed window length for contact submissions, in seconds.
    pub contact_window_secs: u64,
    /// Admitted contact submissions per identity per window.
    pub contact_max_requests: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            contact_window_secs: 60,
            contact_max_requests: 20,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared secret expected in the `X-Admin-Secret` header. Empty
    /// disables admin writes entirely.
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Master switch for outbound mail.
    pub enabled: bool,
    /// Base URL of the HTTP mail provider.
    pub api_url: String,
    /// Bearer key for the provider.
    pub api_key: String,
    /// From header on outbound mail.
    pub from: String,
    /// Recipient of contact notifications.
    pub owner_email: String,
    /// Signature on the auto-reply.
    pub owner_name: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: String::new(),
            api_key: String::new(),
            from: "Portfolio <no-reply@localhost>".to_string(),
            owner_email: String::new(),
            owner_name: "The site owner".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and config files
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            // Load from config file if exists
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Override with environment variables (PORTFOLIO_ prefix)
            .add_source(
                config::Environment::with_prefix("PORTFOLIO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub origin_rules: Arc<OriginRules>,
    pub store: Arc<dyn DocumentStore>,
    pub mailer: Arc<dyn Mailer>,
    pub rate_limit: Arc<RateLimitState>,
}

impl AppState {
    /// Build state from configuration, constructing the default
    /// collaborators.
    pub async fn new(config: AppConfig) -> Result<Self, anyhow::Error> {
        let store: Arc<dyn DocumentStore> = if config.database.url.is_empty() {
            tracing::warn!("No database URL configured; using the in-memory store");
            Arc::new(MemStore::new())
        } else {
            let store =
                PgStore::connect(&config.database.url, config.database.max_connections).await?;
            tracing::info!("Connected to Postgres");
            Arc::new(store)
        };

        let mailer: Arc<dyn Mailer> = if config.mail.enabled && !config.mail.api_url.is_empty() {
            Arc::new(HttpMailer::new(&config.mail)?)
        } else {
            if config.mail.enabled {
                tracing::warn!("mail.api_url not configured; outbound mail disabled");
            }
            Arc::new(NoopMailer)
        };

        Ok(Self::with_collaborators(config, store, mailer))
    }

    /// Build state with explicit collaborators. Tests use this to inject
    /// in-memory stores and recording mailers; it is also the seam for
    /// embedding the router elsewhere.
    pub fn with_collaborators(
        config: AppConfig,
        store: Arc<dyn DocumentStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let origin_rules = Arc::new(OriginRules::compile(&config.cors.allowed_origins));
        let rate_limit = Arc::new(RateLimitState::new(RateLimitConfig {
            max_requests: config.rate_limit.contact_max_requests,
            window: Duration::from_secs(config.rate_limit.contact_window_secs),
        }));

        Self {
            config: Arc::new(config),
            origin_rules,
            store,
            mailer,
            rate_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_local_development() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.rate_limit.contact_window_secs, 60);
        assert_eq!(config.rate_limit.contact_max_requests, 20);
        assert!(config.database.url.is_empty());
        assert!(config.admin.secret.is_empty());
        assert!(config.mail.enabled);
    }
}
