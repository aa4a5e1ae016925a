//! al-sync - push local scripts to Adventure Land code slots
//!
//! Entry point for the al-sync CLI.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::path::PathBuf;
use std::time::Duration;

use al_sync::config::{
    normalize_base_url, normalize_endpoint_path, SyncFile, DEFAULT_BASE_URL, DEFAULT_SAVE_PATH,
    DEFAULT_TIMEOUT_MS, DEFAULT_VERIFY_PATH,
};
use al_sync::observability::{init_tracing, TracingConfig};
use al_sync::{App, Config, Result};
use clap::Parser;

/// al-sync - watch local files and upload them to Adventure Land code slots
#[derive(Parser, Debug)]
#[command(name = "al-sync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Upload every mapping once and exit instead of watching
    #[arg(long)]
    once: bool,

    /// Mapping file
    #[arg(short, long, env = "AL_CONFIG", default_value = "al-sync.config.json")]
    config: PathBuf,

    /// Value of the adventure.land `auth` cookie
    #[arg(long, env = "AL_AUTH", hide_env_values = true)]
    auth: Option<String>,

    /// Server base URL
    #[arg(long, env = "AL_BASE", default_value = DEFAULT_BASE_URL)]
    base: String,

    /// Save endpoint path
    #[arg(long, env = "AL_SAVE_PATH", default_value = DEFAULT_SAVE_PATH)]
    save_path: String,

    /// Load endpoint path used for verification
    #[arg(long, env = "AL_VERIFY_PATH", default_value = DEFAULT_VERIFY_PATH)]
    verify_path: String,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "AL_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "AL_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, env = "AL_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Variables already set in the environment take precedence over `.env`.
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    init_tracing(&TracingConfig {
        level: cli.log_level.clone(),
        json: cli.log_json,
    });

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring .env: {e}"),
    }

    let Some(auth) = cli.auth.as_deref().map(str::trim).filter(|a| !a.is_empty()) else {
        tracing::error!(
            "AL_AUTH missing. Put AL_AUTH=<value of your adventure.land \"auth\" cookie> in .env or the environment."
        );
        std::process::exit(1);
    };

    let root = std::env::current_dir()?;
    let file = SyncFile::load(&root.join(&cli.config), &root)?;

    let config = Config {
        auth: auth.to_string(),
        base_url: normalize_base_url(&cli.base),
        save_path: normalize_endpoint_path(&cli.save_path),
        verify_path: normalize_endpoint_path(&cli.verify_path),
        timeout: Duration::from_millis(cli.timeout_ms),
        debounce: file.debounce,
        mappings: file.mappings,
        log_level: cli.log_level,
    };

    tracing::debug!(
        base = %config.base_url,
        mappings = config.mappings.len(),
        debounce_ms = u64::try_from(config.debounce.as_millis()).unwrap_or(u64::MAX),
        "Configuration loaded"
    );

    config.validate()?;

    let app = App::new(config)?;

    if cli.once {
        app.run_once().await;
        return Ok(());
    }

    app.watch().await
}
