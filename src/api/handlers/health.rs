//! Health and status endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::api::server::AppState;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "relay-fetch"
        })),
    )
}

/// Service status: uptime, retrieval counters and blacklist size
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let blacklist = state.orchestrator.repository().load().await;
    let content_types: Vec<&str> = state.config.catalog.tokens().collect();

    Json(json!({
        "service": "relay-fetch",
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "retrievals": state.stats.snapshot(),
        "blacklisted_endpoints": blacklist.len(),
        "content_types": content_types,
        "max_rounds": state.config.relay.max_rounds,
    }))
}
