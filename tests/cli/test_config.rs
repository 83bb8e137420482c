//! Tests for the show-config command and full `run()` dispatch
//!
//! Tests that touch `QUARRY_*` environment variables run serially.

use crate::cli::test_helpers::{create_cli_test_config, reopen};
use crate::common::TestRepo;
use clap::Parser;
use quarry::cli::commands::config::{execute, ConfigArgs};
use quarry::cli::{run, Cli, OutputFormat};
use quarry::core::config::Config;
use quarry::core::xdg::XdgDirs;
use serial_test::serial;
use std::env;
use std::path::Path;
use tempfile::TempDir;

const ENV_VARS: &[&str] = &[
    "QUARRY_CONFIG",
    "QUARRY_CONFIG_DIR",
    "QUARRY_DATA_DIR",
    "QUARRY_WORKERS",
    "QUARRY_BATCH_SIZE",
    "QUARRY_DEFAULT_K",
    "QUARRY_MAX_K",
];

/// Point XDG resolution into `root` and clear overrides
fn isolate_env(root: &Path) {
    for var in ENV_VARS {
        env::remove_var(var);
    }
    env::set_var("QUARRY_CONFIG_DIR", root.join("config"));
    env::set_var("QUARRY_DATA_DIR", root.join("data"));
}

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

#[test]
fn test_show_config_human_and_json() {
    let (config, _storage) = create_cli_test_config();
    let xdg = XdgDirs {
        config_dir: "/tmp/quarry-config".into(),
        data_dir: "/tmp/quarry-data".into(),
    };

    assert!(execute(ConfigArgs {}, &config, &xdg, OutputFormat::Human).is_ok());
    assert!(execute(ConfigArgs {}, &config, &xdg, OutputFormat::Json).is_ok());
}

#[test]
fn test_show_config_unknown_language() {
    let (mut config, _storage) = create_cli_test_config();
    config.indexing.language = "klingon".to_string();
    let xdg = XdgDirs {
        config_dir: "/tmp/quarry-config".into(),
        data_dir: "/tmp/quarry-data".into(),
    };

    assert!(execute(ConfigArgs {}, &config, &xdg, OutputFormat::Human).is_ok());
}

#[tokio::test]
#[serial]
async fn test_run_index_then_search() {
    let home = TempDir::new().unwrap();
    isolate_env(home.path());
    let repo = TestRepo::small();
    let root = repo.path().to_string_lossy().into_owned();

    let cli = Cli::try_parse_from(["quarry", "index", root.as_str(), "--quiet"]).unwrap();
    run(cli).await.unwrap();

    let cli = Cli::try_parse_from(["quarry", "--format", "json", "search", "cat", "-k", "2"])
        .unwrap();
    run(cli).await.unwrap();

    let config = Config::load_with_xdg(&XdgDirs::new()).unwrap();
    assert_eq!(config.storage.index_dir, home.path().join("data").join("index"));
    assert_eq!(reopen(&config).model.document_count(), 6);

    clear_env();
}

#[tokio::test]
#[serial]
async fn test_run_reads_config_file_and_env() {
    let home = TempDir::new().unwrap();
    isolate_env(home.path());
    std::fs::create_dir_all(home.path().join("config")).unwrap();
    std::fs::write(
        home.path().join("config").join("config.toml"),
        "[indexing]\nworkers = 2\nbatch_size = 7\n\n[search]\ndefault_k = 4\n",
    )
    .unwrap();
    env::set_var("QUARRY_WORKERS", "5");

    let config = Config::load_with_xdg(&XdgDirs::new()).unwrap();
    assert_eq!(config.indexing.workers, 5);
    assert_eq!(config.indexing.batch_size, 7);
    assert_eq!(config.search.default_k, 4);

    let cli = Cli::try_parse_from(["quarry", "show-config"]).unwrap();
    assert!(run(cli).await.is_ok());

    clear_env();
}

#[tokio::test]
#[serial]
async fn test_run_missing_explicit_config_fails() {
    let home = TempDir::new().unwrap();
    isolate_env(home.path());
    env::set_var("QUARRY_CONFIG", home.path().join("absent.toml"));

    let cli = Cli::try_parse_from(["quarry", "stats"]).unwrap();
    let message = run(cli).await.unwrap_err().to_string();
    assert!(message.contains("does not exist"), "Unexpected error: {message}");

    clear_env();
}

#[tokio::test]
#[serial]
async fn test_run_rejects_invalid_config() {
    let home = TempDir::new().unwrap();
    isolate_env(home.path());
    env::set_var("QUARRY_DEFAULT_K", "50");
    env::set_var("QUARRY_MAX_K", "10");

    let cli = Cli::try_parse_from(["quarry", "search", "anything"]).unwrap();
    assert!(run(cli).await.is_err());

    clear_env();
}
