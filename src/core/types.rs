//! Core data types for the quarry search engine.
//!
//! This module defines the records that cross component
//! boundaries: batches handed to persistence, ranked search
//! results and indexing run statistics.

use serde::{Deserialize, Serialize};

/// One indexed document as handed to the persistence gateway
///
/// Carries the raw term sequence (duplicates included) so the store
/// can derive counts and totals itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentData {
    /// Unique document path
    pub path: String,

    /// Terms in document order
    pub terms: Vec<String>,
}

/// A ranked search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Document path
    pub path: String,

    /// TF-IDF score (higher = more relevant, never negative)
    pub score: f64,
}

/// How an indexing run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexOutcome {
    /// The whole tree was traversed
    Completed,
    /// A cancellation signal stopped traversal early; queued files
    /// were still indexed and flushed
    Cancelled,
}

/// Statistics from an indexing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Files handed to workers by the traversal
    pub files_discovered: usize,

    /// Files tokenized and installed in the index model
    pub files_indexed: usize,

    /// Files without a registered decoder
    pub files_skipped: usize,

    /// Files whose decoding failed
    pub files_failed: usize,

    /// Documents committed to the store during this run
    pub documents_persisted: usize,

    /// Successful batch commits
    pub batches_flushed: usize,

    /// Run duration in milliseconds
    pub duration_ms: u64,

    pub outcome: IndexOutcome,
}

impl IndexStats {
    /// Whether the whole tree was indexed
    pub fn is_complete(&self) -> bool {
        self.outcome == IndexOutcome::Completed
    }
}

/// Summary of the in-memory index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSummary {
    /// Number of documents
    pub documents: usize,

    /// Number of distinct terms
    pub terms: usize,

    /// Sum of all document totals
    pub total_terms: u64,
}
