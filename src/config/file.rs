//! JSON mapping file (`al-sync.config.json`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

/// Debounce window used when the file does not set `debounceMs`.
pub const DEFAULT_DEBOUNCE_MS: u64 = 150;

/// Association between a local file, a logical name, and a remote slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mapping {
    /// Absolute path of the local source file.
    pub file: PathBuf,
    /// Logical code name on the server.
    pub name: String,
    /// Remote slot number.
    pub slot: u32,
}

impl Mapping {
    /// File name used in log lines.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map_or_else(|| self.file.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSyncFile {
    #[serde(default)]
    debounce_ms: Value,
    #[serde(default)]
    mappings: Vec<RawMapping>,
}

#[derive(Debug, Deserialize)]
struct RawMapping {
    file: PathBuf,
    name: Value,
    slot: Value,
}

/// Parsed and resolved mapping file.
#[derive(Debug, Clone)]
pub struct SyncFile {
    /// Quiet period before a changed file is synced.
    pub debounce: Duration,
    /// Resolved mappings, never empty.
    pub mappings: Vec<Mapping>,
}

impl SyncFile {
    /// Read and parse a mapping file, resolving relative paths against `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// defines no usable mappings.
    pub fn load(path: &Path, root: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&raw, root)
    }

    /// Parse mapping file contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the mapping list is empty.
    pub fn parse(raw: &str, root: &Path) -> Result<Self> {
        let file: RawSyncFile = serde_json::from_str(raw)?;

        if file.mappings.is_empty() {
            return Err(Error::config("no mappings defined in config file"));
        }

        let mappings = file
            .mappings
            .into_iter()
            .map(|m| m.resolve(root))
            .collect::<Result<Vec<_>>>()?;

        let debounce_ms = parse_debounce_ms(&file.debounce_ms).ok_or_else(|| {
            Error::config(format!("invalid debounceMs {}", file.debounce_ms))
        })?;

        Ok(Self {
            debounce: debounce_from_ms(debounce_ms),
            mappings,
        })
    }
}

impl RawMapping {
    fn resolve(self, root: &Path) -> Result<Mapping> {
        let name = match self.name {
            Value::String(s) => s,
            Value::Null => {
                return Err(Error::config(format!(
                    "mapping for {} has no name",
                    self.file.display()
                )))
            }
            other => other.to_string(),
        };

        let slot = parse_slot(&self.slot).ok_or_else(|| {
            Error::config(format!(
                "mapping \"{name}\" has invalid slot {}",
                self.slot
            ))
        })?;

        Ok(Mapping {
            file: root.join(self.file),
            name,
            slot,
        })
    }
}

fn parse_slot(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `None` means the value is unusable; `Some(None)` means unset.
#[allow(clippy::option_option)]
fn parse_debounce_ms(value: &Value) -> Option<Option<f64>> {
    match value {
        Value::Null => Some(None),
        Value::Number(n) => n.as_f64().map(Some),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|ms| ms.is_finite()).map(Some),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn debounce_from_ms(ms: Option<f64>) -> Duration {
    match ms {
        Some(ms) if ms.is_finite() => Duration::from_millis(ms.max(0.0) as u64),
        _ => Duration::from_millis(DEFAULT_DEBOUNCE_MS),
    }
}
