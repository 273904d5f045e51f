//! Prometheus metrics for the Portfolio API
//!
//! Provides HTTP request, gating, contact, and mail metrics.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Instant;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("portfolio_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"]
    ).unwrap();

    pub static ref HTTP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "portfolio_http_request_duration_seconds",
            "HTTP request duration in seconds"
        ).buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["method", "path"]
    ).unwrap();

    // Gating Metrics
    pub static ref RATE_LIMIT_EXCEEDED_TOTAL: CounterVec = CounterVec::new(
        Opts::new("portfolio_rate_limit_exceeded_total", "Requests rejected by the rate limiter"),
        &["endpoint"]
    ).unwrap();

    pub static ref CORS_DENIED_TOTAL: Counter = Counter::new(
        "portfolio_cors_denied_total",
        "Cross-origin requests rejected by the origin gate"
    ).unwrap();

    // Contact / Mail Metrics
    pub static ref CONTACT_MESSAGES_TOTAL: CounterVec = CounterVec::new(
        Opts::new("portfolio_contact_messages_total", "Contact submissions by outcome"),
        &["outcome"]
    ).unwrap();

    pub static ref MAIL_SENT_TOTAL: CounterVec = CounterVec::new(
        Opts::new("portfolio_mail_sent_total", "Outbound mail attempts"),
        &["kind", "status"]
    ).unwrap();
}

/// Register all metrics with the registry
pub fn register_metrics() {
    REGISTRY
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(RATE_LIMIT_EXCEEDED_TOTAL.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(CORS_DENIED_TOTAL.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(CONTACT_MESSAGES_TOTAL.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(MAIL_SENT_TOTAL.clone()))
        .unwrap();
}

/// Handler for /metrics endpoint - returns Prometheus text format
pub async fn metrics_handler() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    encoder.encode_to_string(&metric_families).unwrap_or_default()
}

/// Middleware recording count and latency for every response
pub async fn track_metrics(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Record a rate-limit rejection
pub fn record_rate_limit_exceeded(endpoint: &str) {
    RATE_LIMIT_EXCEEDED_TOTAL.with_label_values(&[endpoint]).inc();
}

/// Record an origin-gate rejection
pub fn record_cors_denied() {
    CORS_DENIED_TOTAL.inc();
}

/// Record a contact submission outcome (`saved`, `honeypot`, `invalid`)
pub fn record_contact_message(outcome: &str) {
    CONTACT_MESSAGES_TOTAL.with_label_values(&[outcome]).inc();
}

/// Record a mail attempt (`owner` or `autoreply`)
pub fn record_mail_sent(kind: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    MAIL_SENT_TOTAL.with_label_values(&[kind, status]).inc();
}
