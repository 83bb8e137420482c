//! Index command - index a directory tree for search

use crate::cli::output::{colors, format_duration};
use crate::cli::{open_services, OutputFormat};
use crate::core::config::Config;
use crate::core::indexer::CancellationToken;
use crate::core::services::Services;
use crate::core::types::{IndexOutcome, IndexStats};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the index command
#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Directory to index
    pub path: PathBuf,

    /// Glob patterns to include (can be specified multiple times)
    #[arg(long, short = 'i')]
    pub include: Vec<String>,

    /// Glob patterns to exclude (can be specified multiple times)
    #[arg(long, short = 'e')]
    pub exclude: Vec<String>,

    /// Worker threads (overrides configuration)
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Index in memory only; nothing is written to the data directory
    #[arg(long)]
    pub ephemeral: bool,

    /// Suppress progress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Indexing result response
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub path: String,
    #[serde(flatten)]
    pub stats: IndexStats,
    pub documents_in_index: usize,
    pub throughput_files_per_sec: f64,
}

/// Execute the index command
pub async fn execute(
    args: IndexArgs,
    mut config: Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    // Validate path
    let path = args.path.canonicalize().map_err(|e| {
        format!(
            "Invalid path '{}': {}. Make sure the path exists and is accessible.",
            args.path.display(),
            e
        )
    })?;

    if !path.is_dir() {
        return Err(format!(
            "Path '{}' is not a directory. quarry indexes directories, not individual files.",
            path.display()
        )
        .into());
    }

    if !args.include.is_empty() {
        config.indexing.include_patterns = args.include;
    }
    if !args.exclude.is_empty() {
        config.indexing.exclude_patterns = args.exclude;
    }
    if let Some(workers) = args.workers {
        config.indexing.workers = workers;
    }

    let services = if args.ephemeral {
        Services::ephemeral(config)?
    } else {
        open_services(config)?
    };

    if !args.quiet && format == OutputFormat::Human {
        eprintln!(
            "Indexing {}...",
            colors::file_path(&path.display().to_string())
        );
    }

    // Ctrl-C stops traversal; queued files are still indexed and flushed
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, finishing queued files");
                cancel.cancel();
            }
        })
    };

    let worker = services.clone();
    let root = path.clone();
    let result =
        tokio::task::spawn_blocking(move || worker.index_dir_with_cancel(&root, &cancel)).await?;
    watcher.abort();

    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!("Indexing {:?} failed: {}", path, e);
            let _ = services.close();
            return Err(e.into());
        }
    };
    services.close()?;

    let duration_secs = stats.duration_ms as f64 / 1000.0;
    let throughput = if duration_secs > 0.0 {
        stats.files_indexed as f64 / duration_secs
    } else {
        0.0
    };

    let response = IndexResponse {
        path: path.to_string_lossy().into_owned(),
        documents_in_index: services.summary().documents,
        throughput_files_per_sec: throughput,
        stats,
    };

    match format {
        OutputFormat::Human => print_human(&response, duration_secs),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

fn print_human(response: &IndexResponse, duration_secs: f64) {
    let stats = &response.stats;
    let verb = match stats.outcome {
        IndexOutcome::Completed => colors::success("Indexed"),
        IndexOutcome::Cancelled => colors::warning("Cancelled after indexing"),
    };

    println!(
        "{} {} files ({} documents persisted in {} batches) in {}",
        verb,
        colors::number(&stats.files_indexed.to_string()),
        colors::number(&stats.documents_persisted.to_string()),
        colors::number(&stats.batches_flushed.to_string()),
        colors::number(&format_duration(duration_secs))
    );
    if stats.files_skipped > 0 || stats.files_failed > 0 {
        println!(
            "Skipped: {} unsupported, {} failed to decode",
            colors::number(&stats.files_skipped.to_string()),
            colors::number(&stats.files_failed.to_string())
        );
    }
    println!(
        "Index now holds {} documents",
        colors::number(&response.documents_in_index.to_string())
    );
    println!(
        "Throughput: {} files/sec",
        colors::number(&format!("{:.0}", response.throughput_files_per_sec))
    );
}
