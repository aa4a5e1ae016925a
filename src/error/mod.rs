//! Error types and Result aliases for al-sync.
//!
//! This module defines the error hierarchy used throughout the crate.
//! All public functions return `Result<T, Error>` or `Result<T>`.

use thiserror::Error;

/// Result type alias using al-sync's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for al-sync operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Remote code API error.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// File watching error.
    #[error("watcher error: {0}")]
    Watcher(#[from] WatcherError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors talking to the remote code API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Server answered with a non-2xx status.
    #[error("HTTP {status} {status_text}: {}", display_body(.body))]
    Status {
        status: u16,
        status_text: String,
        body: String,
    },

    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// No response within the configured timeout.
    #[error("request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    /// 200 response whose payload says the save did not land.
    #[error("server says \"Not Found\" (save): {0}")]
    Rejected(String),
}

/// File watcher errors.
#[derive(Error, Debug)]
pub enum WatcherError {
    /// Failed to watch path.
    #[error("failed to watch path '{path}': {reason}")]
    WatchFailed { path: String, reason: String },
}

fn display_body(body: &str) -> &str {
    if body.is_empty() {
        "<empty>"
    } else {
        body
    }
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl ApiError {
    /// Maximum number of body characters kept in a rejection message.
    pub const REJECTION_SAMPLE_CHARS: usize = 160;

    /// Create a rejection error carrying a truncated copy of the body.
    pub fn rejected(body: &str) -> Self {
        Self::Rejected(body.chars().take(Self::REJECTION_SAMPLE_CHARS).collect())
    }
}
