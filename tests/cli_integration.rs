//! Tests for the `al-sync` binary: `.env` loading and exit codes.

mod common;

use std::fs;
use std::path::Path;
use std::process::Output;

use common::MockApi;
use tempfile::TempDir;
use tokio::process::Command;

const AL_VARS: [&str; 8] = [
    "AL_AUTH",
    "AL_BASE",
    "AL_CONFIG",
    "AL_SAVE_PATH",
    "AL_VERIFY_PATH",
    "AL_TIMEOUT_MS",
    "AL_LOG_LEVEL",
    "AL_LOG_JSON",
];

fn workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("bot.js"), "// from cli").unwrap();
    fs::write(
        tmp.path().join("al-sync.config.json"),
        r#"{"mappings":[{"file":"bot.js","name":"main","slot":3}]}"#,
    )
    .unwrap();
    tmp
}

fn command(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_al-sync"));
    cmd.current_dir(dir).env_remove("RUST_LOG");
    for var in AL_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn combined(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

/// Test that credentials and the server URL are read from `.env`.
#[tokio::test]
async fn test_once_reads_dotenv() {
    let api = MockApi::start().await;
    let tmp = workspace();
    fs::write(
        tmp.path().join(".env"),
        format!("AL_AUTH=from-dotenv\nAL_BASE={}/\n", api.base_url()),
    )
    .unwrap();

    let output = command(tmp.path()).arg("--once").output().await.unwrap();

    assert!(output.status.success(), "{}", combined(&output));
    assert_eq!(api.state.save_count(), 1);
    assert_eq!(api.state.slot("3").as_deref(), Some("// from cli"));
    let save = api.state.saves.lock().unwrap()[0].clone();
    assert_eq!(save.header("cookie").as_deref(), Some("auth=from-dotenv"));
}

/// Test that the real environment wins over `.env`.
#[tokio::test]
async fn test_environment_overrides_dotenv() {
    let api = MockApi::start().await;
    let tmp = workspace();
    fs::write(
        tmp.path().join(".env"),
        format!("AL_AUTH=from-dotenv\nAL_BASE={}\n", api.base_url()),
    )
    .unwrap();

    let output = command(tmp.path())
        .arg("--once")
        .env("AL_AUTH", "from-env")
        .output()
        .await
        .unwrap();

    assert!(output.status.success(), "{}", combined(&output));
    let save = api.state.saves.lock().unwrap()[0].clone();
    assert_eq!(save.header("cookie").as_deref(), Some("auth=from-env"));
}

/// Test that a missing credential exits with status 1 before any upload.
#[tokio::test]
async fn test_missing_auth_exits_with_error() {
    let api = MockApi::start().await;
    let tmp = workspace();

    let output = command(tmp.path())
        .arg("--once")
        .env("AL_BASE", api.base_url())
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let text = combined(&output);
    assert!(text.contains("AL_AUTH missing"), "{text}");
    assert!(text.contains(".env"), "{text}");
    assert_eq!(api.state.save_count(), 0);
}
