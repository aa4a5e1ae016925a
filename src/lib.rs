//! al-sync
//!
//! Watches local script files and pushes them to Adventure Land code slots,
//! retrying transient failures and reading each slot back to verify it.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod hash;
pub mod observability;
pub mod sync;
pub mod watcher;

pub use app::{App, RunSummary};
pub use config::{Config, Mapping};
pub use error::{ApiError, Error, Result, WatcherError};
