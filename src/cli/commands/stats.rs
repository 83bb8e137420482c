//! Stats command - summarize the stored index

use crate::cli::output::{colors, format_average, print_field, print_header};
use crate::cli::{open_services, OutputFormat};
use crate::core::config::Config;
use clap::Args;
use serde::Serialize;

/// Arguments for the stats command
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Also list the most widespread terms
    #[arg(long, short = 't', value_name = "N")]
    pub top_terms: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TermEntry {
    pub term: String,
    pub documents: u64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub index_dir: String,
    pub documents: usize,
    pub distinct_terms: usize,
    pub total_terms: u64,
    pub average_document_length: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_terms: Vec<TermEntry>,
}

/// Execute the stats command
pub fn execute(
    args: StatsArgs,
    config: Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let index_dir = config.storage.index_dir.to_string_lossy().into_owned();
    let services = open_services(config)?;
    let summary = services.summary();

    let top_terms = match args.top_terms {
        Some(n) => services.model.read(|_, frequencies| {
            let mut terms: Vec<TermEntry> = frequencies
                .iter()
                .map(|(term, count)| TermEntry {
                    term: term.clone(),
                    documents: *count,
                })
                .collect();
            terms.sort_by(|a, b| b.documents.cmp(&a.documents).then_with(|| a.term.cmp(&b.term)));
            terms.truncate(n);
            terms
        }),
        None => Vec::new(),
    };

    let response = StatsResponse {
        index_dir,
        documents: summary.documents,
        distinct_terms: summary.terms,
        total_terms: summary.total_terms,
        average_document_length: if summary.documents > 0 {
            summary.total_terms as f64 / summary.documents as f64
        } else {
            0.0
        },
        top_terms,
    };

    match format {
        OutputFormat::Human => {
            print_header("Index statistics:");
            println!("  {:<18}{}", "Location:", colors::file_path(&response.index_dir));
            print_field("Documents", &response.documents.to_string());
            print_field("Distinct terms", &response.distinct_terms.to_string());
            print_field("Term occurrences", &response.total_terms.to_string());
            print_field(
                "Avg. length",
                &format_average(response.total_terms, response.documents),
            );
            if !response.top_terms.is_empty() {
                println!();
                print_header("Most widespread terms:");
                for entry in &response.top_terms {
                    println!(
                        "  {:<24} {}",
                        entry.term,
                        colors::dim(&format!("{} documents", entry.documents))
                    );
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
