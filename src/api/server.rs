//! API server using Axum
//!
//! Serves content retrieval requests and service status.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::config::{ApiServerConfig, Config};
use crate::error::{RelayError, Result};
use crate::models::RetrievalStats;
use crate::relay::RelayOrchestrator;

use super::middleware::{BasicAuth, RequestLogging};
use super::routes;

/// Shared state for API handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub orchestrator: Arc<RelayOrchestrator>,
    pub auth: BasicAuth,
    pub stats: Arc<RetrievalStats>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, orchestrator: Arc<RelayOrchestrator>) -> Self {
        Self {
            auth: BasicAuth::from_config(&config.auth),
            config,
            orchestrator,
            stats: Arc::new(RetrievalStats::new()),
            started_at: Instant::now(),
        }
    }
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: Config, orchestrator: Arc<RelayOrchestrator>) -> Self {
        Self {
            config: config.api.clone(),
            state: AppState::new(config, orchestrator),
        }
    }

    /// Build the router
    pub fn build_router(&self) -> Router {
        routes::create_router(self.state.clone())
            .layer(axum::middleware::from_fn(RequestLogging::log_request))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| RelayError::InvalidConfig(format!("Invalid API server address: {}", e)))?;

        let router = self.build_router();

        info!("API server listening on {}", addr);
        if self.state.auth.is_enabled() {
            info!("HTTP Basic authentication enabled");
        }

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
            })
            .await
            .map_err(|e| RelayError::Internal(e.to_string()))?;

        info!("API server shut down");
        Ok(())
    }
}
