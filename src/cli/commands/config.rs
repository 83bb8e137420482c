//! Config command - show current configuration

use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::indexer::tokenizer::parse_language;
use crate::core::xdg::XdgDirs;
use clap::Args;
use serde::Serialize;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse<'a> {
    pub config_file: String,
    pub stemming: bool,
    #[serde(flatten)]
    pub config: &'a Config,
}

/// Execute the config command
pub fn execute(
    _args: ConfigArgs,
    config: &Config,
    xdg: &XdgDirs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = ConfigResponse {
        config_file: xdg.config_file().to_string_lossy().into_owned(),
        stemming: parse_language(&config.indexing.language).is_some(),
        config,
    };

    match format {
        OutputFormat::Human => {
            let indexing = &config.indexing;
            println!("Configuration:");
            println!("  config_file: {}", response.config_file);
            println!("  indexing:");
            println!("    workers: {}", indexing.workers);
            println!("    queue_capacity: {}", indexing.queue_capacity);
            println!("    batch_size: {}", indexing.batch_size);
            println!(
                "    language: {}{}",
                indexing.language,
                if response.stemming { "" } else { " (no stemmer, lowercase only)" }
            );
            println!("    max_file_size_mb: {}", indexing.max_file_size_mb);
            println!("    include_patterns: {:?}", indexing.include_patterns);
            println!("    exclude_patterns: {:?}", indexing.exclude_patterns);
            println!("  storage:");
            println!("    index_dir: {}", config.storage.index_dir.display());
            println!("  search:");
            println!("    default_k: {}", config.search.default_k);
            println!("    max_k: {}", config.search.max_k);
            println!("    max_query_length: {}", config.search.max_query_length);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
