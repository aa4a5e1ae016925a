//! Configuration management for al-sync.
//!
//! Supports configuration from:
//! - Command-line arguments (highest priority)
//! - Environment variables (`AL_AUTH`, `AL_BASE`, ...)
//! - The JSON mapping file

mod file;
mod settings;

pub use file::{Mapping, SyncFile, DEFAULT_DEBOUNCE_MS};
pub use settings::{
    normalize_base_url, normalize_endpoint_path, Config, DEFAULT_BASE_URL, DEFAULT_SAVE_PATH,
    DEFAULT_TIMEOUT_MS, DEFAULT_VERIFY_PATH,
};
