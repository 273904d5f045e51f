//! Portfolio API Library
//!
//! Exposes the core components of the portfolio backend for use in tests
//! and other contexts.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use config::{AppConfig, AppState};
pub use error::{AppError, AppResult};
pub use models::*;
pub use routes::app;
