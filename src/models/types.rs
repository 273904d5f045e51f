//! Request payloads and response shapes for the public endpoints.
//!
//! Stored documents themselves stay opaque JSON; these types cover the
//! validated surface of the API.

use serde::{Deserialize, Serialize};

/// Contact form submission
#[derive(Debug, Clone, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    /// Honeypot field; real users never fill it.
    #[serde(default)]
    pub hp: String,
}

/// Journal post creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct JournalPostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Click analytics event
#[derive(Debug, Clone, Deserialize)]
pub struct TrackRequest {
    #[serde(default = "default_action")]
    pub action: String,
    #[serde(default)]
    pub label: String,
}

fn default_action() -> String {
    "unknown".to_string()
}

/// Service banner returned by the root route
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
}
