//! Blacklist repository
//!
//! Durable storage for the relay-endpoint blacklist: one JSON object file,
//! always read and written as a full snapshot.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{RelayError, Result};
use crate::models::Blacklist;

/// Repository for the persisted relay-endpoint blacklist
///
/// Callers that share a path share the file without any coordination; two
/// overlapping saves end with whichever rename lands last.
#[derive(Debug, Clone)]
pub struct BlacklistRepository {
    path: PathBuf,
}

impl BlacklistRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the current blacklist.
    ///
    /// A missing, unreadable or malformed file yields an empty blacklist.
    pub async fn load(&self) -> Blacklist {
        match self.try_load().await {
            Ok(blacklist) => {
                debug!(
                    "Loaded {} blacklisted endpoints from {}",
                    blacklist.len(),
                    self.path.display()
                );
                blacklist
            }
            Err(e) => {
                warn!("Treating blacklist as empty: {}", e);
                Blacklist::new()
            }
        }
    }

    async fn try_load(&self) -> Result<Blacklist> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Blacklist::new()),
            Err(e) => {
                return Err(RelayError::StoreRead(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| {
            RelayError::StoreRead(format!("{}: {}", self.path.display(), e))
        })
    }

    /// Replace the backing file with `blacklist`.
    ///
    /// The snapshot is written to a temporary sibling and renamed into place,
    /// so readers see either the old file or the new one.
    pub async fn save(&self, blacklist: &Blacklist) -> Result<()> {
        let body = serde_json::to_vec(blacklist)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.write_error(e))?;
        }

        let tmp_path = self.tmp_path();
        if let Err(e) = fs::write(&tmp_path, &body).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(self.write_error(e));
        }
        if let Err(e) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(self.write_error(e));
        }

        debug!(
            "Saved {} blacklisted endpoints to {}",
            blacklist.len(),
            self.path.display()
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "blacklist.json".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
    }

    fn write_error(&self, err: std::io::Error) -> RelayError {
        RelayError::StoreWrite(format!("{}: {}", self.path.display(), err))
    }
}
