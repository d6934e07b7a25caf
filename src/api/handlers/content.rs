//! Content retrieval endpoint

use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use tracing::{info, warn};

use crate::api::server::AppState;
use crate::error::{RelayError, Result};

/// Fetch the content registered under `content_type` through the proxy relay.
///
/// An exhausted retrieval still answers 200 with an empty body. The browser work
/// runs on its own task so a dropped connection cannot abandon the session.
pub async fn get_content(
    State(state): State<AppState>,
    Path(content_type): Path<String>,
) -> Result<Response> {
    let target_url = state
        .config
        .catalog
        .resolve(&content_type)
        .ok_or_else(|| {
            warn!("Unsupported content type requested: {}", content_type);
            RelayError::UnknownContentType(content_type.clone())
        })?
        .to_string();

    info!("Fetching '{}' from {}", content_type, target_url);

    // A retrieval runs to completion even if the client goes away.
    let orchestrator = state.orchestrator.clone();
    let stats = state.stats.clone();
    let retrieval = tokio::spawn(async move {
        let result = orchestrator.fetch_content(&target_url).await;
        stats.record(&result);
        result
    });

    let content = retrieval
        .await
        .map_err(|e| RelayError::Internal(format!("Retrieval task failed: {}", e)))??
        .into_text();
    Ok(([(CONTENT_TYPE, "application/javascript")], content).into_response())
}
