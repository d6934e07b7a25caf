//! Scripted in-memory browser used by the unit tests

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::session::{BrowserSession, Locator, Readiness, SessionLauncher};
use super::site::SiteLocators;
use crate::error::{RelayError, Result};
use crate::models::RelayEndpoint;

/// What the fake proxy site does. Round numbers are 1-based navigation counts.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSite {
    /// Relay identifiers offered on every visit, in page order
    pub endpoints: Vec<String>,
    /// Rendered text after submitting through a relay
    pub pages: HashMap<String, String>,
    pub consent_present: bool,
    pub form_missing_rounds: Vec<u32>,
    pub navigation_fails_rounds: Vec<u32>,
    pub session_lost_round: Option<u32>,
    /// Relays whose option cannot be clicked
    pub unselectable: Vec<String>,
    pub panic_on_extract: bool,
}

impl ScriptedSite {
    pub fn with_endpoints(endpoints: &[&str]) -> Self {
        Self {
            endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
            consent_present: true,
            ..Self::default()
        }
    }

    pub fn page(mut self, endpoint: &str, text: &str) -> Self {
        self.pages.insert(endpoint.to_string(), text.to_string());
        self
    }
}

/// Everything the orchestrator did to the fake browser
#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    pub opened: u32,
    pub quits: u32,
    pub navigations: Vec<String>,
    pub consent_clicks: u32,
    pub selected: Vec<String>,
    pub filled: Vec<String>,
    pub submits: u32,
}

pub struct ScriptedLauncher {
    site: Arc<ScriptedSite>,
    log: Arc<Mutex<SessionLog>>,
    fail_start: bool,
}

impl ScriptedLauncher {
    pub fn new(site: ScriptedSite) -> Self {
        Self {
            site: Arc::new(site),
            log: Arc::new(Mutex::new(SessionLog::default())),
            fail_start: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_start: true,
            ..Self::new(ScriptedSite::default())
        }
    }

    pub fn log(&self) -> SessionLog {
        self.log.lock().clone()
    }

    /// A session not tied to any launcher bookkeeping beyond the shared log
    pub fn session(&self) -> ScriptedSession {
        ScriptedSession {
            site: self.site.clone(),
            locators: SiteLocators::proxyium(),
            log: self.log.clone(),
            selected: Mutex::new(None),
            on_entry_page: Mutex::new(false),
        }
    }
}

#[async_trait]
impl SessionLauncher for ScriptedLauncher {
    async fn open(&self) -> Result<Box<dyn BrowserSession>> {
        if self.fail_start {
            return Err(RelayError::SessionStart(
                "chromedriver not reachable".to_string(),
            ));
        }
        self.log.lock().opened += 1;
        Ok(Box::new(self.session()))
    }
}

pub struct ScriptedSession {
    site: Arc<ScriptedSite>,
    locators: SiteLocators,
    log: Arc<Mutex<SessionLog>>,
    selected: Mutex<Option<String>>,
    /// Submitting moves the browser to the proxied page, away from the form
    on_entry_page: Mutex<bool>,
}

impl ScriptedSession {
    fn require_entry_page(&self, locator: &Locator) -> Result<()> {
        if *self.on_entry_page.lock() {
            Ok(())
        } else {
            Err(RelayError::Interaction(format!("no such element: {}", locator)))
        }
    }

    fn round(&self) -> u32 {
        self.log.lock().navigations.len() as u32
    }

    fn endpoint_for(&self, locator: &Locator) -> Option<String> {
        self.site
            .endpoints
            .iter()
            .find(|code| self.locators.relay_option(&RelayEndpoint::new(code.as_str())) == *locator)
            .cloned()
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        let round = {
            let mut log = self.log.lock();
            log.navigations.push(url.to_string());
            log.navigations.len() as u32
        };
        *self.selected.lock() = None;
        *self.on_entry_page.lock() = false;

        if self.site.session_lost_round == Some(round) {
            return Err(RelayError::SessionLost("invalid session id".to_string()));
        }
        if self.site.navigation_fails_rounds.contains(&round) {
            return Err(RelayError::Navigation("net::ERR_NAME_NOT_RESOLVED".to_string()));
        }
        *self.on_entry_page.lock() = true;
        Ok(())
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        _readiness: Readiness,
        timeout: Duration,
    ) -> Result<()> {
        let timed_out = || RelayError::Timeout {
            locator: locator.to_string(),
            seconds: timeout.as_secs(),
        };

        if !*self.on_entry_page.lock() {
            return Err(timed_out());
        }
        if *locator == self.locators.consent_button && !self.site.consent_present {
            return Err(timed_out());
        }
        if *locator == self.locators.relay_form
            && self.site.form_missing_rounds.contains(&self.round())
        {
            return Err(timed_out());
        }
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        self.require_entry_page(locator)?;
        if *locator == self.locators.consent_button {
            self.log.lock().consent_clicks += 1;
            return Ok(());
        }
        if *locator == self.locators.relay_dropdown {
            return Ok(());
        }
        if *locator == self.locators.submit_button {
            self.log.lock().submits += 1;
            *self.on_entry_page.lock() = false;
            return Ok(());
        }

        match self.endpoint_for(locator) {
            Some(code) if self.site.unselectable.contains(&code) => Err(
                RelayError::Interaction(format!("element not interactable: {}", locator)),
            ),
            Some(code) => {
                self.log.lock().selected.push(code.clone());
                *self.selected.lock() = Some(code);
                Ok(())
            }
            None => Err(RelayError::Interaction(format!(
                "no such element: {}",
                locator
            ))),
        }
    }

    async fn attributes(&self, locator: &Locator, name: &str) -> Result<Vec<String>> {
        if *self.on_entry_page.lock()
            && *locator == self.locators.relay_options() && name == self.locators.relay_attribute {
            return Ok(self.site.endpoints.clone());
        }
        Ok(Vec::new())
    }

    async fn fill(&self, locator: &Locator, text: &str) -> Result<()> {
        self.require_entry_page(locator)?;
        if *locator != self.locators.url_input {
            return Err(RelayError::Interaction(format!(
                "no such element: {}",
                locator
            )));
        }
        self.log.lock().filled.push(text.to_string());
        Ok(())
    }

    async fn extract_text(&self) -> Result<String> {
        if self.site.panic_on_extract {
            panic!("renderer crashed");
        }
        let selected = self.selected.lock().clone();
        Ok(selected
            .and_then(|code| self.site.pages.get(&code).cloned())
            .unwrap_or_default())
    }

    async fn quit(self: Box<Self>) -> Result<()> {
        self.log.lock().quits += 1;
        Ok(())
    }
}
