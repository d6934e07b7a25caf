//! API server implementation
//!
//! Exposes the content retrieval endpoint plus health and status routes.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use server::{ApiServer, AppState};
