//! Content verification

use tracing::warn;

/// Decides whether extracted page text is the content we asked for
#[derive(Debug, Clone)]
pub struct ContentVerifier {
    marker: String,
}

impl ContentVerifier {
    pub fn new(marker: impl Into<String>) -> Self {
        let marker = marker.into();
        if marker.is_empty() {
            warn!("Reference marker is empty; every page will pass verification");
        }
        Self { marker }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// True when the reference marker occurs in `text`
    pub fn verify(&self, text: &str) -> bool {
        text.contains(self.marker.as_str())
    }
}
