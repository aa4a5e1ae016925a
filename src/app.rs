//! Run modes: one pass over every mapping, or watch until shutdown.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::signal;

use crate::client::ApiClient;
use crate::config::{Config, Mapping};
use crate::sync::{RetryPolicy, SyncOutcome, Syncer};
use crate::watcher::{Debouncer, FileEvent, FileWatcher};
use crate::Result;

/// Per-run tally for one-shot mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Mappings uploaded.
    pub uploaded: usize,
    /// Mappings skipped because nothing changed.
    pub unchanged: usize,
    /// Mappings whose sync failed.
    pub failed: usize,
}

/// Application driving the sync for all configured mappings.
pub struct App {
    config: Config,
    syncer: Arc<Syncer>,
}

impl App {
    /// Create an application with the default retry policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_retry(config, RetryPolicy::default())
    }

    /// Create an application with a custom retry policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_retry(config: Config, retry: RetryPolicy) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        Ok(Self {
            config,
            syncer: Arc::new(Syncer::new(api, retry)),
        })
    }

    /// The syncer shared by every run mode.
    #[must_use]
    pub const fn syncer(&self) -> &Arc<Syncer> {
        &self.syncer
    }

    /// Upload every mapping once, regardless of earlier state.
    ///
    /// Failures are logged per mapping and do not stop the batch.
    pub async fn run_once(&self) -> RunSummary {
        let mut summary = RunSummary::default();

        for mapping in &self.config.mappings {
            match self.syncer.sync(mapping, true).await {
                Ok(SyncOutcome::Uploaded { .. }) => summary.uploaded += 1,
                Ok(SyncOutcome::Unchanged) => summary.unchanged += 1,
                Err(e) => {
                    tracing::error!("Upload failed for {}: {e}", mapping.name);
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            uploaded = summary.uploaded,
            unchanged = summary.unchanged,
            failed = summary.failed,
            "One-shot sync finished"
        );
        summary
    }

    /// Watch the mapped files until SIGTERM or Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot be started.
    pub async fn watch(self) -> Result<()> {
        self.watch_until(shutdown_signal()).await
    }

    /// Watch the mapped files until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot be started.
    pub async fn watch_until(self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let preloaded = self.syncer.state().preload(&self.config.mappings).await;
        tracing::debug!(preloaded, "Preloaded file hashes");

        let by_file: HashMap<PathBuf, Mapping> = self
            .config
            .mappings
            .iter()
            .map(|m| (m.file.clone(), m.clone()))
            .collect();
        let files: Vec<PathBuf> = by_file.keys().cloned().collect();

        let mut watcher = FileWatcher::new(&files)?;
        let (mut debouncer, mut fired) = Debouncer::<PathBuf, FileEvent>::new(self.config.debounce);

        self.log_banner(by_file.len());

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                event = watcher.recv() => {
                    let Some(event) = event else { break };
                    tracing::debug!(kind = event.kind(), path = %event.path().display(), "File event");
                    debouncer.schedule(event.path().clone(), event);
                }
                Some((path, _event)) = fired.recv() => {
                    if let Some(mapping) = by_file.get(&path) {
                        self.spawn_sync(mapping.clone());
                    }
                }
            }
        }

        tracing::info!("Stopped watching");
        Ok(())
    }

    fn spawn_sync(&self, mapping: Mapping) {
        let syncer = Arc::clone(&self.syncer);
        tokio::spawn(async move {
            if let Err(e) = syncer.sync(&mapping, false).await {
                tracing::error!("Upload failed for {}: {e}", mapping.name);
            }
        });
    }

    fn log_banner(&self, count: usize) {
        tracing::info!("Watching {count} file(s) on {}", self.config.save_url());
        tracing::info!("Verify via {}", self.config.verify_url());
        for m in &self.config.mappings {
            tracing::info!(" • {}  →  name \"{}\", slot {}", m.file.display(), m.name, m.slot);
        }
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
