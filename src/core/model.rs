//! Shared document index and document-frequency table.
//!
//! The two maps are guarded by separate locks. Every mutation takes
//! the document lock first and the frequency lock second, so
//! concurrent upserts of the same path can never interleave their
//! retract/apply steps. Readers use the same order.
//!
//! Document frequency counts *documents*, not occurrences: each
//! distinct term of a document contributes exactly one.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::error::{QuarryError, Result};
use crate::core::types::IndexSummary;

/// Term → occurrence count within one document
pub type TermCounts = HashMap<String, u64>;

/// Path → document
pub type DocumentIndex = HashMap<String, Document>;

/// Term → number of documents containing it
pub type DocumentFrequency = HashMap<String, u64>;

/// Term statistics of a single document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Occurrence count per distinct term
    pub terms: TermCounts,

    /// Number of term occurrences (sum of `terms` values)
    pub total_terms: u64,
}

impl Document {
    /// Build a document from a raw term sequence
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut counts = TermCounts::new();
        let mut total = 0u64;
        for term in terms {
            *counts.entry(term.into()).or_insert(0) += 1;
            total += 1;
        }
        Self {
            terms: counts,
            total_terms: total,
        }
    }

    /// Occurrences of `term` in this document
    pub fn count(&self, term: &str) -> u64 {
        self.terms.get(term).copied().unwrap_or(0)
    }

    /// Distinct terms that actually occur
    fn present_terms(&self) -> impl Iterator<Item = &String> {
        self.terms
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(term, _)| term)
    }
}

/// In-memory index model shared by the pipeline and the scorer
#[derive(Debug, Default)]
pub struct IndexModel {
    documents: Mutex<DocumentIndex>,
    frequencies: Mutex<DocumentFrequency>,
}

impl IndexModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `document` under `path`, replacing any previous entry
    ///
    /// The previous entry's contribution to document frequency is
    /// retracted before the new one is applied.
    pub fn upsert(&self, path: &str, document: Document) {
        let mut documents = self.documents.lock();
        let previous = documents.remove(path);

        let mut frequencies = self.frequencies.lock();
        if let Some(old) = &previous {
            retract(&mut frequencies, old);
        }
        for term in document.present_terms() {
            *frequencies.entry(term.clone()).or_insert(0) += 1;
        }
        drop(frequencies);

        documents.insert(path.to_string(), document);
    }

    /// Install a document given its term counts and total
    pub fn upsert_counts(&self, path: &str, terms: TermCounts, total_terms: u64) {
        self.upsert(path, Document { terms, total_terms });
    }

    /// Delete the document at `path` and retract its contribution
    pub fn remove(&self, path: &str) -> Result<Document> {
        let mut documents = self.documents.lock();
        let removed = documents
            .remove(path)
            .ok_or_else(|| QuarryError::NotFound(path.to_string()))?;

        let mut frequencies = self.frequencies.lock();
        retract(&mut frequencies, &removed);

        Ok(removed)
    }

    /// Replace the whole model, e.g. after loading from the store
    pub fn replace_all(&self, documents: DocumentIndex, frequencies: DocumentFrequency) {
        let mut doc_guard = self.documents.lock();
        let mut freq_guard = self.frequencies.lock();
        *doc_guard = documents;
        *freq_guard = frequencies;
    }

    /// Copy of one document
    pub fn document(&self, path: &str) -> Option<Document> {
        self.documents.lock().get(path).cloned()
    }

    /// Whether `path` is indexed
    pub fn contains(&self, path: &str) -> bool {
        self.documents.lock().contains_key(path)
    }

    /// Number of indexed documents
    pub fn document_count(&self) -> usize {
        self.documents.lock().len()
    }

    /// Number of documents containing `term`
    pub fn document_frequency(&self, term: &str) -> u64 {
        self.frequencies.lock().get(term).copied().unwrap_or(0)
    }

    /// Point-in-time copy of both maps
    pub fn snapshot(&self) -> (DocumentIndex, DocumentFrequency) {
        let documents = self.documents.lock();
        let frequencies = self.frequencies.lock();
        (documents.clone(), frequencies.clone())
    }

    /// Run `f` with both maps locked
    ///
    /// Used by the scorer so a query sees one consistent state
    /// without cloning the index.
    pub fn read<R>(&self, f: impl FnOnce(&DocumentIndex, &DocumentFrequency) -> R) -> R {
        let documents = self.documents.lock();
        let frequencies = self.frequencies.lock();
        f(&documents, &frequencies)
    }

    /// Document, term and occurrence totals
    pub fn summary(&self) -> IndexSummary {
        self.read(|documents, frequencies| IndexSummary {
            documents: documents.len(),
            terms: frequencies.len(),
            total_terms: documents.values().map(|d| d.total_terms).sum(),
        })
    }

    /// Verify the model invariants
    ///
    /// Returns a description of the first violation found.
    pub fn check_consistency(&self) -> std::result::Result<(), String> {
        self.read(check_invariants)
    }
}

/// Verify totals and document frequencies of a pair of maps
pub fn check_invariants(
    documents: &DocumentIndex,
    frequencies: &DocumentFrequency,
) -> std::result::Result<(), String> {
    let mut expected = DocumentFrequency::new();

    for (path, document) in documents {
        let sum: u64 = document.terms.values().sum();
        if sum != document.total_terms {
            return Err(format!(
                "{path}: total_terms is {} but term counts sum to {sum}",
                document.total_terms
            ));
        }
        for term in document.present_terms() {
            *expected.entry(term.clone()).or_insert(0) += 1;
        }
    }

    if let Some((term, _)) = frequencies.iter().find(|(_, count)| **count == 0) {
        return Err(format!("document frequency retains zero entry for '{term}'"));
    }

    if expected.len() != frequencies.len() {
        return Err(format!(
            "document frequency has {} terms, documents contain {}",
            frequencies.len(),
            expected.len()
        ));
    }

    for (term, count) in &expected {
        let actual = frequencies.get(term).copied().unwrap_or(0);
        if actual != *count {
            return Err(format!(
                "document frequency of '{term}' is {actual}, expected {count}"
            ));
        }
    }

    Ok(())
}

/// Derive document frequencies from a document index
pub fn frequencies_of(documents: &DocumentIndex) -> DocumentFrequency {
    let mut frequencies = DocumentFrequency::new();
    for document in documents.values() {
        for term in document.present_terms() {
            *frequencies.entry(term.clone()).or_insert(0) += 1;
        }
    }
    frequencies
}

fn retract(frequencies: &mut DocumentFrequency, document: &Document) {
    for term in document.present_terms() {
        if let Some(count) = frequencies.get_mut(term) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                frequencies.remove(term);
            }
        }
    }
}
