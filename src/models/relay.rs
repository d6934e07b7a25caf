use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One selectable relay offered by the remote proxy site.
///
/// The identifier is whatever the site puts in the option's `data-value`
/// attribute; it is compared byte-for-byte against blacklist keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelayEndpoint(String);

impl RelayEndpoint {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelayEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Relay endpoints known to return something other than the wanted content.
///
/// Serialized as a flat JSON object, `{"<code>": 1, ...}`. Only key presence
/// matters: values read from disk are discarded and every entry is written as `1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    entries: BTreeSet<String>,
}

impl Serialize for Blacklist {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|code| (code, 1)))
    }
}

impl<'de> Deserialize<'de> for Blacklist {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, IgnoredAny>::deserialize(deserializer)?;
        Ok(Self {
            entries: entries.into_keys().collect(),
        })
    }
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains(code)
    }

    pub fn is_blacklisted(&self, endpoint: &RelayEndpoint) -> bool {
        self.contains(endpoint.code())
    }

    /// Mark an endpoint as bad. Returns `false` if it was already listed.
    pub fn insert(&mut self, endpoint: &RelayEndpoint) -> bool {
        self.entries.insert(endpoint.code().to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// True if every entry of `other` is also present here.
    pub fn is_superset_of(&self, other: &Blacklist) -> bool {
        other.codes().all(|code| self.contains(code))
    }
}

impl<S: Into<String>> FromIterator<S> for Blacklist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}
