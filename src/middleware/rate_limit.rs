//! Contact rate limiting middleware
//!
//! Bounds contact-form submissions per client identity using fixed
//! windows. Throttled requests still consume budget, so hammering the
//! endpoint does not earn a free retry at the window boundary. The
//! throttled path is cheap: it touches only the in-memory map, never the
//! store or the mailer.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

use crate::config::AppState;
use crate::error::AppError;
use crate::metrics;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Admitted requests per identity per window
    pub max_requests: u32,
    /// Fixed window length
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 20,
            window: Duration::from_secs(60),
        }
    }
}

/// Per-identity window record
#[derive(Debug, Clone)]
struct RateWindow {
    count: u32,
    window_start: Instant,
}

/// In-memory fixed-window rate limiter
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: RwLock<HashMap<String, RateWindow>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check an identity against the budget.
    /// Returns `Ok(remaining)` when admitted, `Err(retry_after_secs)` when
    /// throttled.
    pub async fn check(&self, key: &str, config: &RateLimitConfig) -> Result<u32, u64> {
        self.check_at(key, config, Instant::now()).await
    }

    async fn check_at(&self, key: &str, config: &RateLimitConfig, now: Instant) -> Result<u32, u64> {
        let mut windows = self.windows.write().await;

        let window = windows.entry(key.to_string()).or_insert(RateWindow {
            count: 0,
            window_start: now,
        });

        // Fresh window once the previous one has fully elapsed
        if now.duration_since(window.window_start) >= config.window {
            window.count = 0;
            window.window_start = now;
        }

        // Throttled requests are still recorded against the window
        window.count = window.count.saturating_add(1);

        if window.count <= config.max_requests {
            Ok(config.max_requests - window.count)
        } else {
            let retry_after = config
                .window
                .as_secs()
                .saturating_sub(now.duration_since(window.window_start).as_secs());
            Err(retry_after.max(1))
        }
    }

    /// Drop identities whose window started longer than `max_age` ago.
    pub async fn sweep(&self, max_age: Duration) {
        self.sweep_at(max_age, Instant::now()).await
    }

    async fn sweep_at(&self, max_age: Duration, now: Instant) {
        let mut windows = self.windows.write().await;
        windows.retain(|_, window| now.duration_since(window.window_start) < max_age);
    }
}

/// Shared rate limiter state for the application
#[derive(Clone)]
pub struct RateLimitState {
    /// Limiter for contact-form submissions
    pub contact_limiter: Arc<RateLimiter>,
    /// Configuration for the contact limiter
    pub contact_config: RateLimitConfig,
}

impl RateLimitState {
    pub fn new(contact_config: RateLimitConfig) -> Self {
        Self {
            contact_limiter: Arc::new(RateLimiter::new()),
            contact_config,
        }
    }

    /// Start the background sweep task. An identity is stale one full
    /// window after its window expired, so entries older than two windows
    /// are dropped.
    pub fn start_sweep_task(self: Arc<Self>) {
        let max_age = self.contact_config.window * 2;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(max_age);
            loop {
                interval.tick().await;
                self.contact_limiter.sweep(max_age).await;
                tracing::debug!("Rate limiter sweep completed");
            }
        });
    }
}

/// Per-identity rate limiting middleware for the contact endpoint
pub async fn contact_rate_limit(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let key = match extract_client_ip(&req) {
        Some(ip) => ip.to_string(),
        None => "unknown".to_string(),
    };

    let rate_limit = &state.rate_limit;
    match rate_limit
        .contact_limiter
        .check(&key, &rate_limit.contact_config)
        .await
    {
        Ok(remaining) => {
            tracing::trace!(client = %key, remaining, "Contact rate limit check passed");
            next.run(req).await
        }
        Err(retry_after) => {
            tracing::warn!(client = %key, retry_after, "Contact rate limit exceeded");
            metrics::record_rate_limit_exceeded("/api/messages");
            AppError::Throttled { retry_after }.into_response()
        }
    }
}

/// Extract client IP from request
/// Checks forwarding headers first, then falls back to connection info
fn extract_client_ip(req: &Request<Body>) -> Option<IpAddr> {
    // X-Forwarded-For (from a reverse proxy); first entry is the client
    if let Some(forwarded) = req.headers().get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first_ip) = value.split(',').next() {
                if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                    return Some(ip);
                }
            }
        }
    }

    if let Some(real_ip) = req.headers().get("x-real-ip") {
        if let Ok(value) = real_ip.to_str() {
            if let Ok(ip) = value.trim().parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_requests: u32, window_secs: u64) -> RateLimitConfig {
        RateLimitConfig {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    #[tokio::test]
    async fn allows_up_to_the_budget() {
        let limiter = RateLimiter::new();
        let config = config(20, 60);

        for i in 0..20 {
            let result = limiter.check("client", &config).await;
            assert!(result.is_ok(), "request {} should be admitted", i + 1);
        }

        assert!(limiter.check("client", &config).await.is_err());
    }

    #[tokio::test]
    async fn remaining_counts_down_to_zero() {
        let limiter = RateLimiter::new();
        let config = config(3, 60);

        assert_eq!(limiter.check("client", &config).await, Ok(2));
        assert_eq!(limiter.check("client", &config).await, Ok(1));
        assert_eq!(limiter.check("client", &config).await, Ok(0));
    }

    #[tokio::test]
    async fn distinct_identities_have_independent_budgets() {
        let limiter = RateLimiter::new();
        let config = config(2, 60);

        assert!(limiter.check("a", &config).await.is_ok());
        assert!(limiter.check("a", &config).await.is_ok());
        assert!(limiter.check("a", &config).await.is_err());

        assert!(limiter.check("b", &config).await.is_ok());
    }

    #[tokio::test]
    async fn window_resets_after_it_elapses() {
        let limiter = RateLimiter::new();
        let config = config(2, 60);
        let start = Instant::now();

        assert!(limiter.check_at("client", &config, start).await.is_ok());
        assert!(limiter.check_at("client", &config, start).await.is_ok());
        assert!(limiter.check_at("client", &config, start).await.is_err());

        let later = start + Duration::from_secs(61);
        assert_eq!(limiter.check_at("client", &config, later).await, Ok(1));
    }

    #[tokio::test]
    async fn throttled_requests_keep_consuming_budget() {
        let limiter = RateLimiter::new();
        let config = config(1, 60);
        let start = Instant::now();

        assert!(limiter.check_at("client", &config, start).await.is_ok());

        // Hammering at the end of the window must not earn an admit right
        // after the boundary: the window resets, but the budget is gone
        // again after one request.
        let near_end = start + Duration::from_secs(59);
        assert!(limiter.check_at("client", &config, near_end).await.is_err());

        let after_reset = start + Duration::from_secs(60);
        assert!(limiter.check_at("client", &config, after_reset).await.is_ok());
        assert!(limiter.check_at("client", &config, after_reset).await.is_err());
    }

    #[tokio::test]
    async fn retry_after_reflects_remaining_window() {
        let limiter = RateLimiter::new();
        let config = config(1, 60);
        let start = Instant::now();

        assert!(limiter.check_at("client", &config, start).await.is_ok());

        let at_ten = start + Duration::from_secs(10);
        match limiter.check_at("client", &config, at_ten).await {
            Err(retry_after) => assert_eq!(retry_after, 50),
            Ok(_) => panic!("expected throttle"),
        }
    }

    #[tokio::test]
    async fn sweep_drops_stale_identities_only() {
        let limiter = RateLimiter::new();
        let config = config(5, 60);
        let start = Instant::now();

        limiter.check_at("stale", &config, start).await.unwrap();
        let recent = start + Duration::from_secs(110);
        limiter.check_at("active", &config, recent).await.unwrap();

        let now = start + Duration::from_secs(125);
        limiter.sweep_at(Duration::from_secs(120), now).await;

        let windows = limiter.windows.read().await;
        assert!(!windows.contains_key("stale"));
        assert!(windows.contains_key("active"));
    }
}
