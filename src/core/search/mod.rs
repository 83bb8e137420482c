//! Search module for TF-IDF ranking.
//!
//! Queries are tokenized like documents and scored against the
//! in-memory index model; the persistence layer is never consulted.

mod query;
mod tfidf;

pub use query::{query_terms, truncate_query};
pub use tfidf::{idf, rank, tf, SearchService};
