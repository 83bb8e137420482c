//! quarry - command-line TF-IDF document search
//!
//! # Examples
//!
//! ```bash
//! # Index a directory
//! quarry index ~/notes
//!
//! # Rank documents
//! quarry search "borrow checker" -k 5
//!
//! # Forget a document
//! quarry remove ~/notes/old.md
//!
//! # Show what is indexed
//! quarry stats --top-terms 20
//! ```

use clap::Parser;
use quarry::cli::output::{print_error, print_warning};
use quarry::cli::{run, Cli};
use quarry::QuarryError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging to stderr; stdout carries command output only
fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.default_log_filter().into());
    let registry = tracing_subscriber::registry().with(filter);

    if cli.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = run(cli).await {
        print_error(&e.to_string());
        if let Some(QuarryError::PersistenceError { pending, .. }) =
            e.downcast_ref::<QuarryError>()
        {
            print_warning(&format!(
                "{} documents were indexed but not saved; re-run the index command to retry",
                pending.len()
            ));
        }
        std::process::exit(1);
    }
}
