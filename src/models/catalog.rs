use std::collections::BTreeMap;

use serde::Serialize;
use url::Url;

use crate::error::{RelayError, Result};

/// Static lookup table from caller-facing content-type tokens to target URLs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContentCatalog {
    entries: BTreeMap<String, String>,
}

impl ContentCatalog {
    /// Parse a `token=url,token=url` list.
    ///
    /// Blank items are ignored. Every URL must be absolute; tokens must be unique.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();

        for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (token, target) = item.split_once('=').ok_or_else(|| {
                RelayError::InvalidConfig(format!(
                    "CONTENT_MAP entry '{}' must look like token=url",
                    item
                ))
            })?;

            let token = token.trim();
            let target = target.trim();
            if token.is_empty() {
                return Err(RelayError::InvalidConfig(format!(
                    "CONTENT_MAP entry '{}' has an empty token",
                    item
                )));
            }

            Url::parse(target).map_err(|e| {
                RelayError::InvalidConfig(format!(
                    "CONTENT_MAP target for '{}' is not a valid URL: {}",
                    token, e
                ))
            })?;

            if entries
                .insert(token.to_string(), target.to_string())
                .is_some()
            {
                return Err(RelayError::InvalidConfig(format!(
                    "CONTENT_MAP token '{}' is defined twice",
                    token
                )));
            }
        }

        Ok(Self { entries })
    }

    /// Look up the target URL for a content-type token
    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
