//! Relay endpoint selection

use tracing::{debug, info};

use super::session::BrowserSession;
use super::site::SiteLocators;
use crate::error::Result;
use crate::models::{Blacklist, RelayEndpoint};

/// Enumerates relay endpoints on the proxy page and drops blacklisted ones
#[derive(Debug, Clone)]
pub struct RelaySelector {
    site: SiteLocators,
}

impl RelaySelector {
    pub fn new(site: SiteLocators) -> Self {
        Self { site }
    }

    /// Expand the relay dropdown so its options can be clicked
    pub async fn open(&self, session: &dyn BrowserSession) -> Result<()> {
        session.click(&self.site.relay_dropdown).await?;
        debug!("Relay dropdown opened");
        Ok(())
    }

    /// Open the relay dropdown and list every offered endpoint in page order
    pub async fn enumerate(&self, session: &dyn BrowserSession) -> Result<Vec<RelayEndpoint>> {
        self.open(session).await?;

        let codes = session
            .attributes(&self.site.relay_options(), &self.site.relay_attribute)
            .await?;
        info!("Relay options found: {}", codes.len());

        Ok(codes
            .into_iter()
            .filter(|code| !code.is_empty())
            .map(RelayEndpoint::new)
            .collect())
    }

    /// Endpoints worth trying this round
    pub async fn candidates(
        &self,
        session: &dyn BrowserSession,
        blacklist: &Blacklist,
    ) -> Result<Vec<RelayEndpoint>> {
        let endpoints = self.enumerate(session).await?;
        Ok(filter_blacklisted(endpoints, blacklist))
    }

    /// Pick `endpoint` in the relay dropdown
    pub async fn select(&self, session: &dyn BrowserSession, endpoint: &RelayEndpoint) -> Result<()> {
        session.click(&self.site.relay_option(endpoint)).await?;
        debug!("Selected relay {}", endpoint);
        Ok(())
    }
}

/// Keep the endpoints not in `blacklist`, preserving their order
pub fn filter_blacklisted(endpoints: Vec<RelayEndpoint>, blacklist: &Blacklist) -> Vec<RelayEndpoint> {
    endpoints
        .into_iter()
        .filter(|endpoint| {
            let bad = blacklist.is_blacklisted(endpoint);
            if bad {
                info!("Skipping blacklisted relay: {}", endpoint);
            }
            !bad
        })
        .collect()
}
