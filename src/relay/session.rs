//! Browser automation seam
//!
//! The orchestrator only talks to these traits, so the retrieval algorithm can
//! be exercised without a real browser.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// How to find an element on the page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Id(String),
    Css(String),
    XPath(String),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "id={}", id),
            Locator::Css(css) => write!(f, "css={}", css),
            Locator::XPath(xpath) => write!(f, "xpath={}", xpath),
        }
    }
}

/// Condition an element must meet before `wait_for` returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Attached to the DOM
    Present,
    /// Displayed and enabled
    Clickable,
}

/// A single browser instance owned by one retrieval call
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Load `url` in the current tab
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Suspend until the first element matching `locator` meets `readiness`,
    /// or fail with `RelayError::Timeout` once `timeout` has elapsed
    async fn wait_for(&self, locator: &Locator, readiness: Readiness, timeout: Duration)
        -> Result<()>;

    /// Click the first element matching `locator`
    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Read attribute `name` from every element matching `locator`, in
    /// document order. Elements without the attribute are skipped.
    async fn attributes(&self, locator: &Locator, name: &str) -> Result<Vec<String>>;

    /// Clear the input matching `locator` and type `text` into it
    async fn fill(&self, locator: &Locator, text: &str) -> Result<()>;

    /// Visible text of the whole rendered page
    async fn extract_text(&self) -> Result<String>;

    /// Terminate the browser. Consumes the session so it can only happen once.
    async fn quit(self: Box<Self>) -> Result<()>;
}

/// Factory for browser sessions
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Start a fresh browser; fails with `RelayError::SessionStart`
    async fn open(&self) -> Result<Box<dyn BrowserSession>>;
}
