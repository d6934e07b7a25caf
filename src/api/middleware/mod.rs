//! API middleware

mod auth;
mod logging;

pub use auth::{require_basic_auth, BasicAuth};
pub use logging::RequestLogging;
