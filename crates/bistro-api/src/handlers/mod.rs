//! # Request Handlers
//!
//! Axum request handlers, grouped by collection. Access checks run in
//! `crate::auth` before any handler here is reached.

use axum::{response::IntoResponse, Json};

pub mod carts;
pub mod menu;
pub mod payments;
pub mod stats;
pub mod token;
pub mod users;

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "bistro-boss",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
