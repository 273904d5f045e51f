//! Middleware module for the Portfolio API
//!
//! Contains the three request gates: the CORS origin gate, the admin
//! secret gate, and the contact rate limiter.

mod auth;
mod cors;
mod rate_limit;

pub use auth::{admin_auth, ADMIN_SECRET_HEADER};
pub use cors::{cors_layer, origin_gate};
pub use rate_limit::{contact_rate_limit, RateLimitConfig, RateLimitState, RateLimiter};
