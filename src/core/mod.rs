//! Core domain logic (interface-agnostic)
//!
//! This module contains all indexing and ranking logic, independent
//! of the command-line front end.
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Records crossing component boundaries
//! - **xdg**: XDG directory handling
//! - **model**: Document index and document frequencies
//! - **indexer**: Walking, decoding, tokenizing pipeline
//! - **search**: TF-IDF ranking
//! - **storage**: Persistence gateway (tantivy, in-memory)
//! - **services**: Unified service container

pub mod config;
pub mod error;
pub mod indexer;
pub mod model;
pub mod search;
pub mod services;
pub mod storage;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{QuarryError, Result};
pub use services::Services;
