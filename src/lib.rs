//! quarry - concurrent TF-IDF document indexer
//!
//! Walks a directory tree, extracts text from plain text, markup and
//! PDF files, and keeps a term-frequency index in memory that ranks
//! documents against free-text queries. Indexed documents are
//! persisted in batches so the index survives restarts.
//!
//! # Architecture
//!
//! - **core**: Domain logic
//!   - config, error, types, xdg
//!   - model (document index, document frequencies)
//!   - indexer (walker, decoders, tokenizer, pipeline)
//!   - search (TF-IDF scorer)
//!   - storage (persistence gateway)
//!   - services (unified service container)
//!
//! - **cli**: Command-line adapter (depends on core)

// Core domain logic
pub mod core;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::error::{QuarryError, Result};
pub use core::services::Services;
pub use core::types::*;
