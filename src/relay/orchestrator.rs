//! Retrieval orchestrator
//!
//! Runs the relay rounds: load the proxy site, try each non-blacklisted relay
//! with the target URL, and keep the first page that passes verification.
//! Relays that return the wrong page are blacklisted; the blacklist is only
//! written back when the whole call comes up empty.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::selector::RelaySelector;
use super::session::{BrowserSession, Readiness, SessionLauncher};
use super::site::{SiteLocators, CONSENT_WAIT, FORM_WAIT};
use super::verifier::ContentVerifier;
use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::models::{Blacklist, RelayEndpoint, RetrievalEvent, RetrievalOutcome, RetrievalState};
use crate::repository::BlacklistRepository;

/// Fetches content through the remote proxy site
pub struct RelayOrchestrator {
    config: RelayConfig,
    launcher: Arc<dyn SessionLauncher>,
    repository: BlacklistRepository,
    verifier: ContentVerifier,
    selector: RelaySelector,
    site: SiteLocators,
}

impl RelayOrchestrator {
    pub fn new(config: RelayConfig, launcher: Arc<dyn SessionLauncher>) -> Self {
        Self::with_site(config, launcher, SiteLocators::proxyium())
    }

    pub fn with_site(
        config: RelayConfig,
        launcher: Arc<dyn SessionLauncher>,
        site: SiteLocators,
    ) -> Self {
        Self {
            repository: BlacklistRepository::new(config.blacklist_path.clone()),
            verifier: ContentVerifier::new(config.reference_marker.clone()),
            selector: RelaySelector::new(site.clone()),
            site,
            launcher,
            config,
        }
    }

    pub fn repository(&self) -> &BlacklistRepository {
        &self.repository
    }

    /// Retrieve `target_url` through the proxy site.
    ///
    /// The browser session is released before this returns, whatever the
    /// outcome, or in the background if the call is dropped first. Only session
    /// start and session loss surface as errors.
    #[instrument(skip(self), fields(fetch_id = %Uuid::new_v4()))]
    pub async fn fetch_content(&self, target_url: &str) -> Result<RetrievalOutcome> {
        let guard = SessionGuard::new(self.launcher.open().await?);
        debug!("Browser session opened");

        let result = AssertUnwindSafe(self.drive(guard.session()?, target_url))
            .catch_unwind()
            .await;

        guard.release().await;

        match result {
            Ok(outcome) => outcome,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    async fn drive(
        &self,
        session: &dyn BrowserSession,
        target_url: &str,
    ) -> Result<RetrievalOutcome> {
        let mut blacklist = self.repository.load().await;
        let initial_size = blacklist.len();

        let max_rounds = self.config.max_rounds;
        let mut state = RetrievalState::Start.advance(RetrievalEvent::Begin, max_rounds);
        let mut content = None;

        while let RetrievalState::RoundInProgress { round } = state {
            info!("Relay round {} of {}", round, max_rounds);

            let event = match self.run_round(session, target_url, &mut blacklist).await? {
                Some(text) => {
                    content = Some(text);
                    RetrievalEvent::RoundVerified
                }
                None => RetrievalEvent::RoundMissed,
            };
            state = state.advance(event, max_rounds);
        }

        match (state, content) {
            (RetrievalState::Succeeded, Some(text)) => {
                info!("Desired content found ({} bytes)", text.len());
                Ok(RetrievalOutcome::Succeeded(text))
            }
            (state, _) => {
                debug_assert!(state.persists_blacklist());
                self.persist(&blacklist, initial_size).await;
                Ok(RetrievalOutcome::Exhausted)
            }
        }
    }

    /// One navigation cycle. `Ok(None)` means the round came up empty.
    async fn run_round(
        &self,
        session: &dyn BrowserSession,
        target_url: &str,
        blacklist: &mut Blacklist,
    ) -> Result<Option<String>> {
        if let Err(e) = session.navigate(&self.config.entry_url).await {
            tolerate(e, "Navigation to the proxy site failed")?;
            return Ok(None);
        }
        info!("Navigated to {}", self.config.entry_url);

        self.dismiss_consent(session).await?;

        if let Err(e) = session
            .wait_for(&self.site.relay_form, Readiness::Present, FORM_WAIT)
            .await
        {
            tolerate(e, "Relay form did not appear")?;
            return Ok(None);
        }
        debug!("Relay form is present");

        let candidates = match self.selector.candidates(session, blacklist).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tolerate(e, "Could not list relay endpoints")?;
                return Ok(None);
            }
        };
        if candidates.is_empty() {
            info!("No usable relay endpoints this round");
            return Ok(None);
        }

        for (index, endpoint) in candidates.into_iter().enumerate() {
            // Submitting lands on the proxied page, so later candidates need the form back.
            if index > 0 {
                if let Err(e) = self.restore_entry_page(session).await {
                    tolerate(e, "Could not return to the relay form")?;
                    return Ok(None);
                }
            }
            debug!("Processing relay: {}", endpoint);

            let text = match self.submit_through(session, &endpoint, target_url).await {
                Ok(text) => text,
                Err(e) => {
                    tolerate(e, "Relay attempt failed")?;
                    continue;
                }
            };

            if !text.is_empty() && self.verifier.verify(&text) {
                info!("Relay {} returned the desired content", endpoint);
                return Ok(Some(text));
            }

            blacklist.insert(&endpoint);
            info!("Relay {} added to blacklist", endpoint);
        }

        Ok(None)
    }

    async fn dismiss_consent(&self, session: &dyn BrowserSession) -> Result<()> {
        let clicked = match session
            .wait_for(&self.site.consent_button, Readiness::Clickable, CONSENT_WAIT)
            .await
        {
            Ok(()) => session.click(&self.site.consent_button).await,
            Err(e) => Err(e),
        };

        match clicked {
            Ok(()) => {
                debug!("Consent button clicked");
                Ok(())
            }
            Err(e) => tolerate(e, "Consent button not found or not clickable"),
        }
    }

    async fn restore_entry_page(&self, session: &dyn BrowserSession) -> Result<()> {
        session.navigate(&self.config.entry_url).await?;
        session
            .wait_for(&self.site.relay_form, Readiness::Present, FORM_WAIT)
            .await?;
        self.selector.open(session).await?;
        debug!("Relay form restored");
        Ok(())
    }

    /// Select `endpoint`, submit the target URL and read back the rendered page
    async fn submit_through(
        &self,
        session: &dyn BrowserSession,
        endpoint: &RelayEndpoint,
        target_url: &str,
    ) -> Result<String> {
        self.selector.select(session, endpoint).await?;

        session.fill(&self.site.url_input, target_url).await?;
        debug!("Target URL entered");

        session.click(&self.site.submit_button).await?;
        debug!("Submit clicked, settling for {:?}", self.config.settle_delay);

        // The proxy gives no completion signal, so wait a fixed time.
        tokio::time::sleep(self.config.settle_delay).await;

        let text = session.extract_text().await?;
        debug!("Page text extracted ({} bytes)", text.len());
        Ok(text)
    }

    async fn persist(&self, blacklist: &Blacklist, initial_size: usize) {
        match self.repository.save(blacklist).await {
            Ok(()) => info!(
                "No content found after all rounds; blacklist saved ({} new, {} total)",
                blacklist.len().saturating_sub(initial_size),
                blacklist.len()
            ),
            Err(e) => error!("No content found and the blacklist could not be saved: {}", e),
        }
    }
}

/// Owns the browser session of one call.
///
/// `release` quits it in place. If the call is dropped before that, the quit
/// is handed to the runtime so the browser never outlives its call.
struct SessionGuard {
    session: Option<Box<dyn BrowserSession>>,
}

impl SessionGuard {
    fn new(session: Box<dyn BrowserSession>) -> Self {
        Self {
            session: Some(session),
        }
    }

    fn session(&self) -> Result<&dyn BrowserSession> {
        self.session
            .as_deref()
            .ok_or_else(|| RelayError::SessionLost("browser session already released".to_string()))
    }

    async fn release(mut self) {
        if let Some(session) = self.session.take() {
            quit_session(session).await;
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        warn!("Retrieval dropped before completion, releasing browser session");
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(quit_session(session));
            }
            Err(_) => error!("No runtime left to release the browser session"),
        }
    }
}

async fn quit_session(session: Box<dyn BrowserSession>) {
    match session.quit().await {
        Ok(()) => debug!("Browser session released"),
        Err(e) => warn!("Browser session did not shut down cleanly: {}", e),
    }
}

/// Log a recoverable failure, or hand back a fatal one
fn tolerate(err: RelayError, context: &str) -> Result<()> {
    if err.is_fatal() {
        return Err(err);
    }
    warn!("{}: {}", context, err);
    Ok(())
}
