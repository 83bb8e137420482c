//! CLI command implementations
//!
//! Each command module handles argument parsing and execution for a specific CLI command.

pub mod completions;
pub mod config;
pub mod index;
pub mod remove;
pub mod search;
pub mod stats;

// Re-export argument types for use in mod.rs
pub use completions::CompletionsArgs;
pub use config::ConfigArgs;
pub use index::IndexArgs;
pub use remove::RemoveArgs;
pub use search::SearchArgs;
pub use stats::StatsArgs;
