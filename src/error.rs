use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Unified error type for the relay-fetch application
#[derive(Error, Debug)]
pub enum RelayError {
    // Browser session errors
    #[error("Browser session could not be started: {0}")]
    SessionStart(String),

    #[error("Browser session lost: {0}")]
    SessionLost(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Timed out after {seconds}s waiting for {locator}")]
    Timeout { locator: String, seconds: u64 },

    #[error("Page interaction failed: {0}")]
    Interaction(String),

    // Blacklist store errors
    #[error("Blacklist could not be read: {0}")]
    StoreRead(String),

    #[error("Blacklist could not be written: {0}")]
    StoreWrite(String),

    // Request errors
    #[error("Content type not supported")]
    UnknownContentType(String),

    // Authentication errors
    #[error("Authentication failed")]
    AuthenticationFailed,

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for relay-fetch operations
pub type Result<T> = std::result::Result<T, RelayError>;

impl RelayError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            RelayError::UnknownContentType(_) | RelayError::InvalidConfig(_) => {
                StatusCode::BAD_REQUEST
            }

            // 401 Unauthorized
            RelayError::AuthenticationFailed => StatusCode::UNAUTHORIZED,

            // 502 Bad Gateway
            RelayError::SessionLost(_)
            | RelayError::Navigation(_)
            | RelayError::Interaction(_) => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable
            RelayError::SessionStart(_) => StatusCode::SERVICE_UNAVAILABLE,

            // 504 Gateway Timeout
            RelayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,

            // 500 Internal Server Error
            RelayError::StoreRead(_)
            | RelayError::StoreWrite(_)
            | RelayError::MissingEnvVar(_)
            | RelayError::Json(_)
            | RelayError::Io(_)
            | RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this error ends a retrieval call instead of skipping a round or candidate.
    ///
    /// Only a browser that never started or has gone away is fatal; everything else
    /// the remote page can throw at us is treated as bad luck for the current step.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RelayError::SessionStart(_) | RelayError::SessionLost(_))
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

// Implement IntoResponse for API error responses
impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

// Convert from URL parse errors
impl From<url::ParseError> for RelayError {
    fn from(err: url::ParseError) -> Self {
        RelayError::InvalidConfig(err.to_string())
    }
}
