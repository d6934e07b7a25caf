//! HTTP Basic authentication middleware

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tracing::{debug, info, warn};

use crate::api::server::AppState;
use crate::config::AuthConfig;
use crate::error::{RelayError, Result};

/// Basic authentication handler
#[derive(Clone)]
pub struct BasicAuth {
    /// Whether authentication is enabled
    enabled: bool,
    /// Expected username
    username: String,
    /// Expected password
    password: String,
}

impl BasicAuth {
    /// Create a new auth handler
    pub fn new(enabled: bool, username: String, password: String) -> Self {
        Self {
            enabled,
            username,
            password,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.enabled,
            config.username.clone(),
            config.password.clone(),
        )
    }

    /// Create a disabled auth handler
    pub fn disabled() -> Self {
        Self::new(false, String::new(), String::new())
    }

    /// Check if authentication is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Validate the Authorization header
    pub fn validate(&self, headers: &HeaderMap) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let auth_header = headers.get(AUTHORIZATION).ok_or_else(|| {
            info!("Authentication failed - credentials missing");
            RelayError::AuthenticationFailed
        })?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| RelayError::AuthenticationFailed)?;

        // Parse "Basic <base64>"
        let encoded = auth_str.strip_prefix("Basic ").ok_or_else(|| {
            warn!("Invalid auth scheme, expected Basic");
            RelayError::AuthenticationFailed
        })?;

        let decoded = BASE64
            .decode(encoded.trim())
            .map_err(|_| RelayError::AuthenticationFailed)?;

        let credentials =
            String::from_utf8(decoded).map_err(|_| RelayError::AuthenticationFailed)?;

        let (user, pass) = credentials
            .split_once(':')
            .ok_or(RelayError::AuthenticationFailed)?;

        if user.is_empty() || pass.is_empty() {
            info!("Authentication failed - username or password missing");
            return Err(RelayError::AuthenticationFailed);
        }

        if user == self.username && pass == self.password {
            debug!("Authentication successful for user: {}", user);
            Ok(())
        } else {
            warn!("Authentication failed for user: {}", user);
            Err(RelayError::AuthenticationFailed)
        }
    }
}

/// Reject requests without valid credentials when auth is enabled
pub async fn require_basic_auth(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    match state.auth.validate(req.headers()) {
        Ok(()) => next.run(req).await,
        Err(e) => {
            let mut response = e.into_response();
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"relay-fetch\""),
            );
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_auth(auth: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(auth_value) = auth {
            headers.insert(AUTHORIZATION, auth_value.parse().unwrap());
        }
        headers
    }

    fn enabled() -> BasicAuth {
        BasicAuth::new(true, "user".to_string(), "pass".to_string())
    }

    #[test]
    fn test_auth_disabled() {
        let auth = BasicAuth::disabled();
        assert!(!auth.is_enabled());
        assert!(auth.validate(&headers_with_auth(None)).is_ok());
    }

    #[test]
    fn test_auth_missing_header() {
        assert!(matches!(
            enabled().validate(&headers_with_auth(None)),
            Err(RelayError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_auth_valid_credentials() {
        let credentials = BASE64.encode(b"user:pass");
        let headers = headers_with_auth(Some(&format!("Basic {}", credentials)));
        assert!(enabled().validate(&headers).is_ok());
    }

    #[test]
    fn test_auth_invalid_credentials() {
        let credentials = BASE64.encode(b"wrong:wrong");
        let headers = headers_with_auth(Some(&format!("Basic {}", credentials)));
        assert!(matches!(
            enabled().validate(&headers),
            Err(RelayError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_auth_empty_password() {
        let auth = BasicAuth::new(true, "user".to_string(), String::new());
        let credentials = BASE64.encode(b"user:");
        let headers = headers_with_auth(Some(&format!("Basic {}", credentials)));
        assert!(auth.validate(&headers).is_err());
    }

    #[test]
    fn test_auth_invalid_scheme() {
        let headers = headers_with_auth(Some("Bearer token123"));
        assert!(matches!(
            enabled().validate(&headers),
            Err(RelayError::AuthenticationFailed)
        ));
    }
}
