//! Configuration management for quarry.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.

use crate::core::error::{QuarryError, Result};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Indexing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexingConfig {
    /// Worker threads tokenizing files
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Capacity of the path queue between walker and workers
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Documents per persistence transaction
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Stemming language (e.g. "english"); unknown names disable stemming
    #[serde(default = "default_language")]
    pub language: String,

    /// Maximum file size in MB (skip larger files)
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: usize,

    /// File patterns to include (glob syntax, empty = everything)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// File patterns to exclude (glob syntax)
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory of the document store
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,
}

/// Search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Default number of results to return
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Maximum results per query
    #[serde(default = "default_max_k")]
    pub max_k: usize,

    /// Queries are truncated to this many characters
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,
}

// Default value functions
fn default_workers() -> usize {
    10
}

fn default_queue_capacity() -> usize {
    200
}

fn default_batch_size() -> usize {
    50
}

fn default_language() -> String {
    "english".to_string()
}

fn default_max_file_size() -> usize {
    10
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("./quarry-index")
}

fn default_k() -> usize {
    10
}

fn default_max_k() -> usize {
    100
}

fn default_max_query_length() -> usize {
    500
}

fn default_exclude_patterns() -> Vec<String> {
    [
        "**/.git/**",
        "**/node_modules/**",
        "**/target/**",
        "**/vendor/**",
        "**/build/**",
        "**/dist/**",
        "**/__pycache__/**",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            batch_size: default_batch_size(),
            language: default_language(),
            max_file_size_mb: default_max_file_size(),
            include_patterns: Vec::new(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            index_dir: default_index_dir(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            max_k: default_max_k(),
            max_query_length: default_max_query_length(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| QuarryError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    ///
    /// Config file lookup order:
    /// 1. QUARRY_CONFIG env var
    /// 2. XDG config file (~/.config/quarry/config.toml)
    /// 3. ./quarry.toml
    /// 4. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let xdg_config = xdg.config_file();
        let mut config = if xdg_config.exists() {
            Self::from_file(xdg_config)?
        } else if env::var("QUARRY_CONFIG").is_ok() {
            return Err(QuarryError::ConfigError(format!(
                "Config file {xdg_config:?} does not exist"
            )));
        } else if Path::new("quarry.toml").exists() {
            Self::from_file("quarry.toml")?
        } else {
            Self::default()
        };

        // Default store location follows XDG unless set explicitly
        if config.storage.index_dir == default_index_dir() {
            config.storage.index_dir = xdg.index_dir();
        }

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        // Indexing configuration
        if let Some(workers) = env_parse("QUARRY_WORKERS") {
            self.indexing.workers = workers;
        }
        if let Some(capacity) = env_parse("QUARRY_QUEUE_CAPACITY") {
            self.indexing.queue_capacity = capacity;
        }
        if let Some(batch) = env_parse("QUARRY_BATCH_SIZE") {
            self.indexing.batch_size = batch;
        }
        if let Ok(language) = env::var("QUARRY_LANGUAGE") {
            self.indexing.language = language;
        }
        if let Some(size) = env_parse("QUARRY_MAX_FILE_SIZE_MB") {
            self.indexing.max_file_size_mb = size;
        }

        // Storage configuration
        if let Ok(data_dir) = env::var("QUARRY_DATA_DIR") {
            self.storage.index_dir = PathBuf::from(data_dir).join("index");
        }

        // Search configuration
        if let Some(k) = env_parse("QUARRY_DEFAULT_K") {
            self.search.default_k = k;
        }
        if let Some(k) = env_parse("QUARRY_MAX_K") {
            self.search.max_k = k;
        }
        if let Some(len) = env_parse("QUARRY_MAX_QUERY_LENGTH") {
            self.search.max_query_length = len;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let nonzero = [
            (self.indexing.workers, "Worker count"),
            (self.indexing.queue_capacity, "Queue capacity"),
            (self.indexing.batch_size, "Batch size"),
            (self.indexing.max_file_size_mb, "Max file size"),
            (self.search.default_k, "Default k"),
            (self.search.max_query_length, "Max query length"),
        ];
        if let Some((_, name)) = nonzero.iter().find(|(value, _)| *value == 0) {
            return Err(QuarryError::ConfigError(format!("{name} must be non-zero")));
        }

        if self.search.default_k > self.search.max_k {
            return Err(QuarryError::ConfigError(
                "Default k cannot exceed max k".to_string(),
            ));
        }

        Ok(())
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!(
            "  Workers: {}, queue: {}, batch: {}",
            self.indexing.workers,
            self.indexing.queue_capacity,
            self.indexing.batch_size
        );
        tracing::info!("  Language: {}", self.indexing.language);
        tracing::info!("  Max file size: {} MB", self.indexing.max_file_size_mb);
        tracing::info!(
            "  Include patterns: {} patterns",
            self.indexing.include_patterns.len()
        );
        tracing::info!(
            "  Exclude patterns: {} patterns",
            self.indexing.exclude_patterns.len()
        );
        tracing::info!("  Index dir: {:?}", self.storage.index_dir);
        tracing::info!("  Default k: {}", self.search.default_k);
        tracing::info!("  Max k: {}", self.search.max_k);
        tracing::info!("  Max query length: {}", self.search.max_query_length);
    }
}

/// Parse an environment variable, ignoring unset or malformed values
fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring malformed {}={:?}", name, raw);
            None
        }
    }
}
