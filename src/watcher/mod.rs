//! File system watching.
//!
//! This module provides:
//! - Watching of the mapped files using notify-rs
//! - A keyed debouncer that collapses editor write bursts

mod debounce;
mod events;
#[allow(clippy::module_inception)]
mod watcher;

pub use debounce::Debouncer;
pub use events::FileEvent;
pub use watcher::FileWatcher;
