//! Request handlers
//!
//! Thin handlers over the store and mailer collaborators. Gating (origin,
//! admin secret, rate limit) happens in the middleware layer before any of
//! these run.

pub mod admin;
pub mod contact;
pub mod content;
pub mod stats;
