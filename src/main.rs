//! Relay Fetch Server - Entry Point
//!
//! Starts the API server with graceful shutdown support.

use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use relay_fetch::api::ApiServer;
use relay_fetch::config::{Config, LogConfig};
use relay_fetch::error;
use relay_fetch::relay::{RelayOrchestrator, WebDriverLauncher};

#[tokio::main]
async fn main() -> error::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log);

    info!("Starting Relay Fetch");
    info!(
        "Relay: {} (max {} rounds, {}s settle delay), blacklist at {}",
        config.relay.entry_url,
        config.relay.max_rounds,
        config.relay.settle_delay.as_secs(),
        config.relay.blacklist_path.display()
    );
    info!(
        "Content types: {}",
        config.catalog.tokens().collect::<Vec<_>>().join(", ")
    );

    // One browser per retrieval, launched on demand
    let launcher = Arc::new(WebDriverLauncher::new(config.browser.clone()));
    let orchestrator = Arc::new(RelayOrchestrator::new(config.relay.clone(), launcher));

    let api_server = ApiServer::new(config.clone(), orchestrator);

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let api_task = tokio::spawn(async move {
        if let Err(e) = api_server.run(shutdown_rx).await {
            error!("API server error: {}", e);
        }
    });

    info!("Server started - API: {}", config.api_addr());

    // Wait for shutdown signal
    shutdown_signal().await;
    info!("Shutdown signal received");

    let _ = shutdown_tx.send(true);
    let _ = api_task.await;

    info!("Relay Fetch stopped");
    Ok(())
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("relay_fetch={},tower_http=debug", log.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if log.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
