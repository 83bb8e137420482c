//! Remove command - drop a document from the index

use crate::cli::output::{colors, print_success};
use crate::cli::{open_services, OutputFormat};
use crate::core::config::Config;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the remove command
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Path of the indexed document
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub removed: String,
    pub documents_remaining: usize,
}

/// Execute the remove command
pub fn execute(
    args: RemoveArgs,
    config: Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let services = open_services(config)?;

    // Indexed paths are canonical; the file itself may already be gone
    let key = args
        .path
        .canonicalize()
        .unwrap_or_else(|_| args.path.clone())
        .to_string_lossy()
        .into_owned();

    if let Err(e) = services.remove_file(&key) {
        let _ = services.close();
        if e.is_not_found() {
            return Err(format!(
                "'{}' is not in the index. Run 'quarry search --all --files-only \"\"' to list indexed documents.",
                key
            )
            .into());
        }
        return Err(e.into());
    }
    services.close()?;

    let response = RemoveResponse {
        removed: key,
        documents_remaining: services.model.document_count(),
    };

    match format {
        OutputFormat::Human => {
            print_success(&format!("Removed {}", response.removed));
            println!(
                "{} documents remain",
                colors::number(&response.documents_remaining.to_string())
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
