//! Data models for the Portfolio API

mod types;

pub use types::*;
