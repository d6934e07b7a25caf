//! Relay Fetch - content retrieval through a public web-proxy relay
//!
//! Retrieves pages by submitting them to a third-party web proxy site with a
//! headless browser, trying the site's relay endpoints one by one.
//!
//! ## Features
//!
//! - Round-based relay selection with a persistent endpoint blacklist
//! - Marker-based verification of the retrieved page
//! - Headless Chrome over WebDriver, released on every exit path
//! - Small HTTP API mapping content-type tokens to target URLs
//! - Optional HTTP Basic authentication

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod relay;
pub mod repository;

pub use config::Config;
pub use error::{RelayError, Result};
pub use relay::RelayOrchestrator;
