//! DOM contract of the remote proxy site

use std::time::Duration;

use super::session::Locator;
use crate::models::RelayEndpoint;

/// How long to wait for the cookie consent button to become clickable
pub const CONSENT_WAIT: Duration = Duration::from_secs(5);

/// How long to wait for the relay form to appear after navigation
pub const FORM_WAIT: Duration = Duration::from_secs(10);

/// Element locators for the proxy site's entry page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLocators {
    pub consent_button: Locator,
    pub relay_form: Locator,
    pub relay_dropdown: Locator,
    /// CSS selector matching every relay option inside the dropdown
    pub relay_options_css: String,
    /// Option attribute holding the relay identifier
    pub relay_attribute: String,
    pub url_input: Locator,
    pub submit_button: Locator,
}

impl SiteLocators {
    /// Locators for proxyium.com
    pub fn proxyium() -> Self {
        Self {
            consent_button: Locator::XPath("//p[contains(text(), 'Consent')]".to_string()),
            relay_form: Locator::Id("web_proxy_form".to_string()),
            relay_dropdown: Locator::Id("unique-nice-select".to_string()),
            relay_options_css: "#unique-nice-select .list .option".to_string(),
            relay_attribute: "data-value".to_string(),
            url_input: Locator::Id("unique-form-control".to_string()),
            submit_button: Locator::Id("unique-btn-blue".to_string()),
        }
    }

    /// All relay options
    pub fn relay_options(&self) -> Locator {
        Locator::Css(self.relay_options_css.clone())
    }

    /// The option carrying `endpoint`'s identifier
    pub fn relay_option(&self, endpoint: &RelayEndpoint) -> Locator {
        Locator::Css(format!(
            "{}[{}=\"{}\"]",
            self.relay_options_css,
            self.relay_attribute,
            escape_css_string(endpoint.code())
        ))
    }
}

impl Default for SiteLocators {
    fn default() -> Self {
        Self::proxyium()
    }
}

fn escape_css_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
