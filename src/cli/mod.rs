//! CLI adapter for quarry
//!
//! Provides the command-line interface over the indexing and search
//! services. Depends on `core/`; `core/` knows nothing about it.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |     core/        |
//! |  (domain logic)  |
//! +--------+---------+
//!          |
//!          v
//! +------------------+
//! |      cli/        |
//! | (clap adapter)   |
//! +------------------+
//! ```

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use crate::core::config::Config;
use crate::core::services::Services;

/// quarry - TF-IDF document search
///
/// Index a directory of text, markup and PDF files, then rank the
/// documents against free-text queries.
#[derive(Parser, Debug)]
#[command(name = "quarry")]
#[command(version)]
#[command(about = "TF-IDF document search engine", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index a directory tree
    Index(commands::IndexArgs),

    /// Rank indexed documents against a query
    Search(commands::SearchArgs),

    /// Remove a document from the index
    Remove(commands::RemoveArgs),

    /// Show index statistics
    Stats(commands::StatsArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  quarry completions bash > ~/.local/share/bash-completion/completions/quarry
    ///   zsh:   quarry completions zsh > ~/.zfunc/_quarry
    ///   fish:  quarry completions fish > ~/.config/fish/completions/quarry.fish
    Completions(commands::CompletionsArgs),
}

impl Cli {
    /// Log filter used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "quarry=warn",
            1 => "quarry=info",
            _ => "quarry=debug",
        }
    }
}

/// Open services over the persistent store and load its contents
pub fn open_services(config: Config) -> Result<Services, Box<dyn std::error::Error>> {
    let services = Services::new(config)?;
    let loaded = services.load()?;
    tracing::debug!("Loaded {} documents", loaded);
    Ok(services)
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::xdg::XdgDirs;

    let format = cli.format;

    // Handle completions command early (doesn't need configuration)
    let command = match cli.command {
        Commands::Completions(args) => return commands::completions::execute(args),
        command => command,
    };

    let xdg = XdgDirs::new();
    xdg.log_paths();
    xdg.ensure_dirs_exist()?;

    let config = Config::load_with_xdg(&xdg)?;
    config.log_config();

    match command {
        Commands::Index(args) => commands::index::execute(args, config, format).await,
        Commands::Search(args) => commands::search::execute(args, config, format),
        Commands::Remove(args) => commands::remove::execute(args, config, format),
        Commands::Stats(args) => commands::stats::execute(args, config, format),
        Commands::ShowConfig(args) => commands::config::execute(args, &config, &xdg, format),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
