//! Health check handlers

use axum::{routing::get, Router};
use serde::Serialize;

use crate::{constants::messages, handlers::envelope::ApiResponse, state::AppState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
async fn health_check() -> ApiResponse<HealthResponse> {
    ApiResponse::ok(
        messages::HEALTHY,
        HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    )
}

/// Health routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
