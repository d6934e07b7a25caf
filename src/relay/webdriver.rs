//! WebDriver-backed browser sessions
//!
//! Drives a headless Chrome through a chromedriver (or Selenium) endpoint.

use std::time::Duration;

use async_trait::async_trait;
use thirtyfour::prelude::*;
use thirtyfour::PageLoadStrategy;
use tracing::{debug, instrument};

use super::session::{BrowserSession, Locator, Readiness, SessionLauncher};
use crate::config::BrowserConfig;
use crate::error::{RelayError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Chrome switches that keep the automation footprint small
pub fn chrome_args(headless: bool) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "--no-sandbox".into(),
        "--disable-dev-shm-usage".into(),
        "--disable-blink-features=AutomationControlled".into(),
        "--disable-infobars".into(),
        "--disable-gpu".into(),
    ];
    if headless {
        args.push("--headless=new".into());
    }
    args
}

async fn make_driver(config: &BrowserConfig) -> WebDriverResult<WebDriver> {
    let mut caps = DesiredCapabilities::chrome();
    for arg in chrome_args(config.headless) {
        caps.add_arg(&arg)?;
    }
    caps.set_page_load_strategy(PageLoadStrategy::Normal)?;

    let driver = WebDriver::new(&config.webdriver_url, caps).await?;
    driver.set_script_timeout(SCRIPT_TIMEOUT).await?;
    Ok(driver)
}

/// Whether a WebDriver error means the browser behind the session is gone
pub fn session_gone(message: &str) -> bool {
    let s = message.to_lowercase();
    s.contains("invalid session id")
        || s.contains("session deleted")
        || s.contains("not connected to devtools")
}

fn classify(err: WebDriverError, otherwise: impl FnOnce(String) -> RelayError) -> RelayError {
    let message = err.to_string();
    if session_gone(&message) {
        RelayError::SessionLost(message)
    } else {
        otherwise(message)
    }
}

fn to_by(locator: &Locator) -> By {
    match locator {
        Locator::Id(id) => By::Id(id.as_str()),
        Locator::Css(css) => By::Css(css.as_str()),
        Locator::XPath(xpath) => By::XPath(xpath.as_str()),
    }
}

/// Launches one Chrome instance per retrieval call
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    config: BrowserConfig,
}

impl WebDriverLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionLauncher for WebDriverLauncher {
    #[instrument(skip(self), fields(webdriver = %self.config.webdriver_url))]
    async fn open(&self) -> Result<Box<dyn BrowserSession>> {
        let driver = make_driver(&self.config)
            .await
            .map_err(|e| RelayError::SessionStart(e.to_string()))?;
        debug!("WebDriver session started");
        Ok(Box::new(WebDriverSession { driver }))
    }
}

/// A live Chrome session
pub struct WebDriverSession {
    driver: WebDriver,
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.driver
            .goto(url)
            .await
            .map_err(|e| classify(e, |m| RelayError::Navigation(format!("{}: {}", url, m))))
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        readiness: Readiness,
        timeout: Duration,
    ) -> Result<()> {
        let query = self.driver.query(to_by(locator)).wait(timeout, POLL_INTERVAL);
        let query = match readiness {
            Readiness::Present => query,
            Readiness::Clickable => query.and_clickable(),
        };

        query.first().await.map(|_| ()).map_err(|e| {
            classify(e, |_| RelayError::Timeout {
                locator: locator.to_string(),
                seconds: timeout.as_secs(),
            })
        })
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let element = self
            .driver
            .find(to_by(locator))
            .await
            .map_err(|e| classify(e, |m| RelayError::Interaction(format!("{}: {}", locator, m))))?;
        element
            .click()
            .await
            .map_err(|e| classify(e, |m| RelayError::Interaction(format!("{}: {}", locator, m))))
    }

    async fn attributes(&self, locator: &Locator, name: &str) -> Result<Vec<String>> {
        let elements = self
            .driver
            .find_all(to_by(locator))
            .await
            .map_err(|e| classify(e, |m| RelayError::Interaction(format!("{}: {}", locator, m))))?;

        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            let value = element.attr(name).await.map_err(|e| {
                classify(e, |m| RelayError::Interaction(format!("{}@{}: {}", locator, name, m)))
            })?;
            if let Some(value) = value {
                values.push(value);
            }
        }
        Ok(values)
    }

    async fn fill(&self, locator: &Locator, text: &str) -> Result<()> {
        let interaction = |m: String| RelayError::Interaction(format!("{}: {}", locator, m));

        let element = self
            .driver
            .find(to_by(locator))
            .await
            .map_err(|e| classify(e, interaction))?;
        element.clear().await.map_err(|e| classify(e, interaction))?;
        element
            .send_keys(text)
            .await
            .map_err(|e| classify(e, interaction))
    }

    async fn extract_text(&self) -> Result<String> {
        let body = self
            .driver
            .find(By::Tag("body"))
            .await
            .map_err(|e| classify(e, RelayError::Interaction))?;
        body.text()
            .await
            .map_err(|e| classify(e, RelayError::Interaction))
    }

    async fn quit(self: Box<Self>) -> Result<()> {
        let session = *self;
        session
            .driver
            .quit()
            .await
            .map_err(|e| RelayError::Internal(format!("WebDriver quit failed: {}", e)))
    }
}
