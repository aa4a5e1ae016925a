//! File system watcher using notify-rs.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::events::FileEvent;
use crate::error::WatcherError;
use crate::Result;

/// Watches a fixed set of files.
///
/// Each file's parent directory is watched so that editors which save by
/// writing a temp file and renaming it over the original are still seen.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    event_rx: mpsc::Receiver<FileEvent>,
    watched_dirs: Vec<PathBuf>,
}

impl FileWatcher {
    /// Start watching `files`.
    ///
    /// # Errors
    ///
    /// Returns an error if a parent directory is missing or cannot be watched.
    pub fn new(files: &[PathBuf]) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::channel(100);
        let targets = build_targets(files);

        let mut watcher = notify::recommended_watcher(
            move |result: std::result::Result<Event, notify::Error>| match result {
                Ok(event) => {
                    for path in event.paths {
                        let Some(target) = targets.get(&path) else {
                            continue;
                        };
                        if let Some(file_event) = FileEvent::from_kind(&event.kind, target.clone()) {
                            let _ = event_tx.blocking_send(file_event);
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("Watch error: {:?}", e);
                }
            },
        )
        .map_err(|e| WatcherError::WatchFailed {
            path: "init".to_string(),
            reason: e.to_string(),
        })?;

        let dirs: BTreeSet<PathBuf> = files.iter().map(|f| parent_dir(f)).collect();
        for dir in &dirs {
            if !dir.is_dir() {
                return Err(WatcherError::WatchFailed {
                    path: dir.display().to_string(),
                    reason: "directory does not exist".to_string(),
                }
                .into());
            }

            watcher
                .watch(dir, RecursiveMode::NonRecursive)
                .map_err(|e| WatcherError::WatchFailed {
                    path: dir.display().to_string(),
                    reason: e.to_string(),
                })?;
            tracing::debug!(path = %dir.display(), "Watching directory");
        }

        Ok(Self {
            _watcher: watcher,
            event_rx,
            watched_dirs: dirs.into_iter().collect(),
        })
    }

    /// Receive the next event for a watched file.
    ///
    /// Returns `None` if the watcher has been dropped.
    pub async fn recv(&mut self) -> Option<FileEvent> {
        self.event_rx.recv().await
    }

    /// Directories being watched.
    #[must_use]
    pub fn watched_dirs(&self) -> &[PathBuf] {
        &self.watched_dirs
    }
}

fn parent_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Map every spelling of a watched file to the path it was configured as.
///
/// Some backends report canonical paths (e.g. `/private/var` on macOS), so
/// the canonical form of each file is registered alongside the given one.
fn build_targets(files: &[PathBuf]) -> HashMap<PathBuf, PathBuf> {
    let mut targets = HashMap::new();
    for file in files {
        targets.insert(file.clone(), file.clone());

        if let (Ok(dir), Some(name)) = (parent_dir(file).canonicalize(), file.file_name()) {
            targets.insert(dir.join(name), file.clone());
        }
    }
    targets
}
