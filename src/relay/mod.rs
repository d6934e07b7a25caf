//! Proxy-relay retrieval
//!
//! This module provides the retrieval pipeline:
//! - Browser session abstraction and the WebDriver implementation
//! - DOM locators for the remote proxy site
//! - Relay endpoint selection against the blacklist
//! - Content verification
//! - The round-based orchestrator tying it together

pub mod orchestrator;
pub mod selector;
pub mod session;
pub mod site;
pub mod verifier;
pub mod webdriver;

#[cfg(test)]
pub(crate) mod testing;

pub use orchestrator::RelayOrchestrator;
pub use selector::{filter_blacklisted, RelaySelector};
pub use session::{BrowserSession, Locator, Readiness, SessionLauncher};
pub use site::SiteLocators;
pub use verifier::ContentVerifier;
pub use webdriver::WebDriverLauncher;
