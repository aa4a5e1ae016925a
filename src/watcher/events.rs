//! File system event types.

use std::path::PathBuf;

use notify::EventKind;

/// Change seen on a mapped file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    /// File appeared (created, or moved into place).
    Added(PathBuf),
    /// File contents changed.
    Changed(PathBuf),
}

impl FileEvent {
    /// Classify a notify event for one path. Removals and access are ignored.
    #[must_use]
    pub fn from_kind(kind: &EventKind, path: PathBuf) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Added(path)),
            EventKind::Modify(_) => Some(Self::Changed(path)),
            _ => None,
        }
    }

    /// Get the path associated with this event.
    #[must_use]
    pub const fn path(&self) -> &PathBuf {
        match self {
            Self::Added(p) | Self::Changed(p) => p,
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Added(_) => "add",
            Self::Changed(_) => "change",
        }
    }
}
