//! Upload-then-verify for a single mapping.

use std::fmt;
use std::sync::Arc;

use tracing::Instrument;

use super::retry::RetryPolicy;
use super::state::SyncState;
use crate::client::{ApiClient, UploadRequest, VerifyRequest};
use crate::config::Mapping;
use crate::error::ApiError;
use crate::hash::content_hash;
use crate::Result;

/// Characters of server code shown when verification finds a mismatch.
pub const SAMPLE_CHARS: usize = 120;

/// Result of reading the slot back after an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Server code equals the uploaded file.
    Match,
    /// Server code differs; holds the start of the server's copy.
    Differs { sample: String },
    /// The load call failed or returned nothing usable.
    Unavailable,
}

impl Verification {
    fn compare(local: &str, server: Option<String>) -> Self {
        match server {
            None => Self::Unavailable,
            Some(server) if server == local => Self::Match,
            Some(server) => Self::Differs {
                sample: sample(&server),
            },
        }
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match => f.write_str("match"),
            Self::Differs { .. } => f.write_str("differs"),
            Self::Unavailable => f.write_str("skipped or unavailable"),
        }
    }
}

/// What a sync call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Contents matched the last upload; nothing was sent.
    Unchanged,
    /// Contents were uploaded.
    Uploaded { verification: Verification },
}

/// Pushes mapped files to their slots.
#[derive(Debug)]
pub struct Syncer {
    api: ApiClient,
    state: Arc<SyncState>,
    retry: RetryPolicy,
}

impl Syncer {
    /// Create a syncer with empty state.
    #[must_use]
    pub fn new(api: ApiClient, retry: RetryPolicy) -> Self {
        Self {
            api,
            state: Arc::new(SyncState::new()),
            retry,
        }
    }

    /// Shared sync state.
    #[must_use]
    pub const fn state(&self) -> &Arc<SyncState> {
        &self.state
    }

    /// Upload a mapping's file if it changed since the last upload.
    ///
    /// With `force`, uploads even when the contents are unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or every upload attempt
    /// fails. State is left untouched in that case.
    pub async fn sync(&self, mapping: &Mapping, force: bool) -> Result<SyncOutcome> {
        let span = tracing::info_span!("sync", name = %mapping.name, slot = mapping.slot);
        self.sync_inner(mapping, force).instrument(span).await
    }

    async fn sync_inner(&self, mapping: &Mapping, force: bool) -> Result<SyncOutcome> {
        let entry = self.state.entry(&mapping.file);
        let mut last_hash = entry.lock().await;

        let code = tokio::fs::read_to_string(&mapping.file).await?;
        let hash = content_hash(&code);

        if !force && last_hash.as_deref() == Some(hash.as_str()) {
            tracing::debug!(path = %mapping.file.display(), "File unchanged, skipping");
            return Ok(SyncOutcome::Unchanged);
        }

        let label = format!("{} (slot {})", mapping.name, mapping.slot);
        let verification = self
            .retry
            .run(&label, || self.upload_and_verify(mapping, &code))
            .await?;

        *last_hash = Some(hash);
        Ok(SyncOutcome::Uploaded { verification })
    }

    async fn upload_and_verify(
        &self,
        mapping: &Mapping,
        code: &str,
    ) -> std::result::Result<Verification, ApiError> {
        let request = UploadRequest {
            name: &mapping.name,
            slot: mapping.slot,
            code,
        };
        self.api.upload(&request).await?;

        tracing::info!(
            "Uploaded \"{}\" to slot {} ({})",
            mapping.name,
            mapping.slot,
            mapping.file_name()
        );

        let server = self.api.verify(VerifyRequest { slot: mapping.slot }).await;
        let verification = Verification::compare(code, server);
        match &verification {
            Verification::Differs { sample } => {
                tracing::warn!("Verify: differs");
                tracing::warn!("Server sample: {sample}");
            }
            Verification::Match => tracing::info!("Verify: match"),
            Verification::Unavailable => tracing::info!("Verification skipped or unavailable"),
        }

        Ok(verification)
    }
}

fn sample(code: &str) -> String {
    let mut chars = code.chars();
    let mut out: String = chars.by_ref().take(SAMPLE_CHARS).collect();
    if chars.next().is_some() {
        out.push('…');
    }
    out
}
