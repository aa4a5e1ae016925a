//! Change-driven uploads.
//!
//! This module provides:
//! - Per-file sync state keyed by content hash
//! - Bounded exponential-backoff retry
//! - The upload-then-verify sequence for one mapping

mod engine;
mod retry;
mod state;

pub use engine::{SyncOutcome, Syncer, Verification, SAMPLE_CHARS};
pub use retry::RetryPolicy;
pub use state::SyncState;
