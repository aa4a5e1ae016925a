//! Configuration settings and validation.

use std::time::Duration;

use super::file::{Mapping, DEFAULT_DEBOUNCE_MS};
use crate::{Error, Result};

/// Default remote server.
pub const DEFAULT_BASE_URL: &str = "https://adventure.land";

/// Default save endpoint path.
pub const DEFAULT_SAVE_PATH: &str = "/api/save_code";

/// Default load endpoint path.
pub const DEFAULT_VERIFY_PATH: &str = "/api/load_code";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Main configuration for al-sync.
///
/// Built once at startup and passed to the components that need it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Value of the `auth` session cookie.
    pub auth: String,

    /// Server base URL without trailing slashes.
    pub base_url: String,

    /// Save endpoint path with exactly one leading slash.
    pub save_path: String,

    /// Load endpoint path with exactly one leading slash.
    pub verify_path: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Quiet period before a changed file is synced.
    pub debounce: Duration,

    /// Files to sync.
    pub mappings: Vec<Mapping>,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            save_path: DEFAULT_SAVE_PATH.to_string(),
            verify_path: DEFAULT_VERIFY_PATH.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            mappings: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.auth.trim().is_empty() {
            return Err(Error::config("AL_AUTH is missing"));
        }

        if self.mappings.is_empty() {
            return Err(Error::config("no mappings defined"));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "invalid log level '{}', must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.timeout.is_zero() {
            return Err(Error::config("timeout cannot be 0"));
        }

        if self.base_url.is_empty() {
            return Err(Error::config("base URL cannot be empty"));
        }

        Ok(())
    }

    /// Full URL of the save endpoint.
    #[must_use]
    pub fn save_url(&self) -> String {
        format!("{}{}", self.base_url, self.save_path)
    }

    /// Full URL of the load endpoint.
    #[must_use]
    pub fn verify_url(&self) -> String {
        format!("{}{}", self.base_url, self.verify_path)
    }
}

/// Strip every trailing slash from a base URL.
#[must_use]
pub fn normalize_base_url(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

/// Force exactly one leading slash on an endpoint path.
#[must_use]
pub fn normalize_endpoint_path(path: &str) -> String {
    format!("/{}", path.trim().trim_start_matches('/'))
}
