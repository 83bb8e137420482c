//! Search command - rank indexed documents against a query

use crate::cli::output::{colors, format_score};
use crate::cli::{open_services, OutputFormat};
use crate::core::config::Config;
use clap::Args;
use serde::Serialize;

/// Arguments for the search command
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Free-text query
    pub query: String,

    /// Maximum number of results (defaults to search.default_k)
    #[arg(long, short = 'k')]
    pub limit: Option<usize>,

    /// Print every document, including zero scores
    #[arg(long, conflicts_with = "limit")]
    pub all: bool,

    /// Only show file paths (no scores)
    #[arg(long)]
    pub files_only: bool,
}

/// Search result item
#[derive(Debug, Serialize)]
pub struct SearchResultItem {
    pub rank: usize,
    pub path: String,
    pub score: f64,
}

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchResponseOutput {
    pub query: String,
    pub documents_searched: usize,
    pub total_results: usize,
    pub results: Vec<SearchResultItem>,
}

/// Execute the search command
pub fn execute(
    args: SearchArgs,
    config: Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let services = open_services(config)?;

    let results = if args.all {
        services.search_query(&args.query)
    } else {
        services.search_top(&args.query, args.limit)
    };

    let output = SearchResponseOutput {
        query: args.query.clone(),
        documents_searched: services.model.document_count(),
        total_results: results.len(),
        results: results
            .into_iter()
            .enumerate()
            .map(|(i, r)| SearchResultItem {
                rank: i + 1,
                path: r.path,
                score: r.score,
            })
            .collect(),
    };

    match format {
        OutputFormat::Human => {
            if output.documents_searched == 0 {
                println!(
                    "The index is empty. Run '{}' first.",
                    colors::label("quarry index <dir>")
                );
            } else if output.results.is_empty() {
                println!("No results for '{}'", colors::label(&args.query));
            } else {
                if !args.files_only {
                    println!(
                        "Top {} of {} documents for '{}':\n",
                        colors::number(&output.total_results.to_string()),
                        colors::number(&output.documents_searched.to_string()),
                        colors::label(&args.query)
                    );
                }
                for result in &output.results {
                    if args.files_only {
                        println!("{}", colors::file_path(&result.path));
                    } else {
                        println!(
                            "[{}] {} {}",
                            colors::rank(&result.rank.to_string()),
                            colors::file_path(&result.path),
                            colors::score(&format!("(score: {})", format_score(result.score)))
                        );
                    }
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
