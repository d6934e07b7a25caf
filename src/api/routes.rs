//! API route definitions

use axum::routing::get;
use axum::Router;

use super::handlers;
use super::middleware::require_basic_auth;
use super::server::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check (no auth required)
        .route("/health", get(handlers::health::health_check))
        .merge(protected_routes(state.clone()))
        .with_state(state)
}

/// Routes that require authentication when it is enabled
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/get_content/:content_type",
            get(handlers::content::get_content),
        )
        .route("/api/status", get(handlers::health::status))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            require_basic_auth,
        ))
}
