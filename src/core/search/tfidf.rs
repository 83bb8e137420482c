//! TF-IDF ranking over the in-memory index model.
//!
//! For a query term `t` and document `d`:
//!
//! ```text
//! tf(t, d) = count(t, d) / total_terms(d)      (0 when total_terms(d) = 0)
//! idf(t)   = ln((N + 1) / (df(t) + 1))         (N = documents, at least 1)
//! score(d) = Σ tf(t, d) · idf(t)               over query terms, duplicates included
//! ```
//!
//! Every document is ranked, including those scoring 0. Ties are
//! broken by ascending path so results are deterministic.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use crate::core::indexer::tokenizer::TermNormalizer;
use crate::core::model::{Document, DocumentFrequency, DocumentIndex, IndexModel};
use crate::core::search::query::query_terms;
use crate::core::types::SearchResult;

/// Term frequency of `term` in `document`
pub fn tf(term: &str, document: &Document) -> f64 {
    if document.total_terms == 0 {
        return 0.0;
    }
    document.count(term) as f64 / document.total_terms as f64
}

/// Smoothed inverse document frequency
///
/// An empty index counts as one document.
pub fn idf(document_count: usize, document_frequency: u64) -> f64 {
    let n = document_count.max(1) as f64;
    ((n + 1.0) / (document_frequency as f64 + 1.0)).ln()
}

/// Rank every document of `documents` against `terms`
pub fn rank(
    documents: &DocumentIndex,
    frequencies: &DocumentFrequency,
    terms: &[String],
) -> Vec<SearchResult> {
    let weights: Vec<(&str, f64)> = terms
        .iter()
        .map(|term| {
            let df = frequencies.get(term).copied().unwrap_or(0);
            (term.as_str(), idf(documents.len(), df))
        })
        .collect();

    let mut results: Vec<SearchResult> = documents
        .iter()
        .map(|(path, document)| SearchResult {
            path: path.clone(),
            score: weights
                .iter()
                .map(|(term, weight)| tf(term, document) * weight)
                .sum(),
        })
        .collect();

    results.sort_by(compare_results);
    results
}

/// Descending score, then ascending path
fn compare_results(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.path.cmp(&b.path))
}

/// TF-IDF search service over a shared index model
#[derive(Debug, Clone)]
pub struct SearchService {
    model: Arc<IndexModel>,
    normalizer: TermNormalizer,
    default_k: usize,
    max_k: usize,
    max_query_length: usize,
}

impl SearchService {
    /// Create a new search service
    ///
    /// `normalizer` must match the one used for indexing.
    pub fn new(
        model: Arc<IndexModel>,
        normalizer: TermNormalizer,
        default_k: usize,
        max_k: usize,
        max_query_length: usize,
    ) -> Self {
        Self {
            model,
            normalizer,
            default_k,
            max_k,
            max_query_length,
        }
    }

    /// Rank every indexed document against `query`
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        let start = Instant::now();
        let terms = query_terms(query, self.max_query_length, &self.normalizer);

        let results = self
            .model
            .read(|documents, frequencies| rank(documents, frequencies, &terms));

        tracing::debug!(
            "Ranked {} documents for {} query terms in {}ms",
            results.len(),
            terms.len(),
            start.elapsed().as_millis()
        );

        results
    }

    /// Best `k` results (default `default_k`, capped at `max_k`)
    pub fn search_top(&self, query: &str, k: Option<usize>) -> Vec<SearchResult> {
        let limit = k.unwrap_or(self.default_k).min(self.max_k);
        let mut results = self.search(query);
        results.truncate(limit);
        results
    }
}
