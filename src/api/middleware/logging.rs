//! Retrieval-aware request logging
//!
//! `TraceLayer` already records every request at the HTTP level. This layer adds
//! what an operator needs for content retrievals: which content type was asked
//! for, how long the browser work took, and whether the caller got anything back.

use std::time::Instant;

use axum::body::{Body, HttpBody};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, info, warn};

const CONTENT_ROUTE: &str = "/get_content/";

/// Request logging middleware
pub struct RequestLogging;

impl RequestLogging {
    pub async fn log_request(req: Request<Body>, next: Next) -> Response {
        let content_type = retrieval_token(req.uri().path()).map(str::to_owned);
        let start = Instant::now();

        let response = next.run(req).await;

        let Some(content_type) = content_type else {
            return response;
        };

        let elapsed = start.elapsed();
        let status = response.status();
        if !status.is_success() {
            info!("Retrieval of '{}' answered {} after {:?}", content_type, status, elapsed);
        } else if is_empty_body(&response) {
            warn!("Retrieval of '{}' came back empty after {:?}", content_type, elapsed);
        } else {
            debug!("Retrieval of '{}' delivered content in {:?}", content_type, elapsed);
        }

        response
    }
}

/// The content-type token of a retrieval request path
fn retrieval_token(path: &str) -> Option<&str> {
    path.strip_prefix(CONTENT_ROUTE)
        .filter(|token| !token.is_empty() && !token.contains('/'))
}

fn is_empty_body(response: &Response) -> bool {
    response.body().size_hint().exact() == Some(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_retrieval_token() {
        assert_eq!(retrieval_token("/get_content/scores"), Some("scores"));
        assert_eq!(retrieval_token("/get_content/"), None);
        assert_eq!(retrieval_token("/get_content/a/b"), None);
        assert_eq!(retrieval_token("/health"), None);
        assert_eq!(retrieval_token("/api/status"), None);
    }

    #[test]
    fn test_empty_body_detection() {
        assert!(is_empty_body(&"".into_response()));
        assert!(!is_empty_body(&"window.scores = [];".into_response()));
    }
}
