//! In-memory record of what was last uploaded for each file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;

use crate::config::Mapping;
use crate::hash::content_hash;

/// Last uploaded hash for one file. Holding the lock marks the file busy.
pub(crate) type FileEntry = Arc<AsyncMutex<Option<String>>>;

/// Sync state shared by the run loop and the sync tasks.
///
/// Each path has its own async lock, held for a whole upload, so at most
/// one upload per file is in flight.
#[derive(Debug, Default)]
pub struct SyncState {
    entries: Mutex<HashMap<PathBuf, FileEntry>>,
}

impl SyncState {
    /// Create an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry for a path, creating it if needed.
    pub(crate) fn entry(&self, path: &Path) -> FileEntry {
        Arc::clone(self.entries.lock().entry(path.to_path_buf()).or_default())
    }

    /// Last uploaded hash for a path.
    pub async fn last_hash(&self, path: &Path) -> Option<String> {
        let entry = self.entries.lock().get(path).cloned()?;
        let hash = entry.lock().await;
        hash.clone()
    }

    /// Record the hash of freshly uploaded contents.
    pub async fn record(&self, path: &Path, hash: String) {
        *self.entry(path).lock().await = Some(hash);
    }

    /// Hash the current contents of every mapped file.
    ///
    /// Files that cannot be read yet are skipped. Returns how many were hashed.
    pub async fn preload(&self, mappings: &[Mapping]) -> usize {
        let mut loaded = 0;
        for mapping in mappings {
            match tokio::fs::read_to_string(&mapping.file).await {
                Ok(code) => {
                    self.record(&mapping.file, content_hash(&code)).await;
                    loaded += 1;
                }
                Err(e) => {
                    tracing::debug!(path = %mapping.file.display(), error = %e, "Skipping preload");
                }
            }
        }
        loaded
    }

    /// Number of tracked files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if no file is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
