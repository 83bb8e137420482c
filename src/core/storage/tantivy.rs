//! Tantivy-backed persistence gateway.
//!
//! Each indexed path is one tantivy document holding the path, the
//! total term count and the per-term counts as stored JSON. Nothing is
//! searched through tantivy itself; it provides crash-safe segments and
//! atomic commits.

use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use tantivy::collector::DocSetCollector;
use tantivy::query::AllQuery;
use tantivy::schema::{Field, Schema, Value, STORED, STRING};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

use crate::core::error::{QuarryError, Result};
use crate::core::model::{frequencies_of, Document, DocumentFrequency, DocumentIndex, TermCounts};
use crate::core::storage::PersistenceGateway;
use crate::core::types::DocumentData;

/// Writer heap budget (50MB)
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Create the Tantivy schema for document storage
///
/// Fields:
/// - path: Document path, unique key (STRING | STORED)
/// - total_terms: Number of term occurrences (u64 | STORED)
/// - term_counts: JSON object term -> count (STORED)
/// - indexed_at: Timestamp (Date | STORED)
pub fn create_schema() -> Schema {
    let mut builder = Schema::builder();

    builder.add_text_field("path", STRING | STORED);
    builder.add_u64_field("total_terms", STORED);
    builder.add_text_field("term_counts", STORED);
    builder.add_date_field("indexed_at", STORED);

    builder.build()
}

#[derive(Debug, Clone, Copy)]
struct StoreFields {
    path: Field,
    total_terms: Field,
    term_counts: Field,
    indexed_at: Field,
}

impl StoreFields {
    fn resolve(schema: &Schema) -> Result<Self> {
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|e| QuarryError::StorageError(format!("Missing {name} field: {e}")))
        };

        Ok(Self {
            path: field("path")?,
            total_terms: field("total_terms")?,
            term_counts: field("term_counts")?,
            indexed_at: field("indexed_at")?,
        })
    }
}

/// Tantivy index used as a document store
pub struct TantivyStore {
    index: Index,
    fields: StoreFields,
    /// `None` once closed
    writer: Mutex<Option<IndexWriter>>,
    dir: PathBuf,
}

impl std::fmt::Debug for TantivyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TantivyStore")
            .field("dir", &self.dir)
            .field("open", &self.writer.lock().is_some())
            .finish()
    }
}

impl TantivyStore {
    /// Open the store at `index_dir`, creating it if absent
    pub fn open(index_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(index_dir)?;

        let index = if index_dir.join("meta.json").exists() {
            Index::open_in_dir(index_dir)
                .map_err(|e| QuarryError::StorageError(format!("Failed to open index: {e}")))?
        } else {
            tracing::info!("Creating document store at {:?}", index_dir);
            Index::create_in_dir(index_dir, create_schema())
                .map_err(|e| QuarryError::StorageError(format!("Failed to create index: {e}")))?
        };

        let fields = StoreFields::resolve(&index.schema())?;

        let writer: IndexWriter = index
            .writer(WRITER_HEAP_BYTES)
            .map_err(|e| QuarryError::StorageError(format!("Failed to create writer: {e}")))?;

        Ok(Self {
            index,
            fields,
            writer: Mutex::new(Some(writer)),
            dir: index_dir.to_path_buf(),
        })
    }

    /// Directory holding the index
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of live documents as of the last commit
    pub fn document_count(&self) -> Result<u64> {
        Ok(self.reader()?.searcher().num_docs())
    }

    /// Fresh reader pinned to the latest commit
    fn reader(&self) -> Result<IndexReader> {
        self.index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| QuarryError::StorageError(format!("Failed to create reader: {e}")))
    }

    fn to_tantivy(&self, data: &DocumentData) -> Result<TantivyDocument> {
        let document = Document::from_terms(&data.terms);
        let counts = serde_json::to_string(&document.terms)?;

        Ok(doc!(
            self.fields.path => data.path.as_str(),
            self.fields.total_terms => document.total_terms,
            self.fields.term_counts => counts,
            self.fields.indexed_at => tantivy::DateTime::from_timestamp_secs(
                Utc::now().timestamp()
            ),
        ))
    }

    fn from_tantivy(&self, stored: &TantivyDocument) -> Result<(String, Document)> {
        let path = stored
            .get_first(self.fields.path)
            .and_then(|v| v.as_str())
            .ok_or_else(|| QuarryError::StorageError("Stored document without path".into()))?
            .to_string();
        let total_terms = stored
            .get_first(self.fields.total_terms)
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        let terms: TermCounts = match stored
            .get_first(self.fields.term_counts)
            .and_then(|v| v.as_str())
        {
            Some(json) => serde_json::from_str(json)?,
            None => TermCounts::new(),
        };

        Ok((path, Document { terms, total_terms }))
    }

    /// Apply `stage` to the writer and commit, rolling back on failure
    fn transact<F>(&self, stage: F) -> Result<()>
    where
        F: FnOnce(&mut IndexWriter) -> Result<()>,
    {
        let mut guard = self.writer.lock();
        let writer = guard
            .as_mut()
            .ok_or_else(|| QuarryError::StorageError("Document store is closed".into()))?;

        let result = stage(writer).and_then(|()| {
            writer
                .commit()
                .map(|_| ())
                .map_err(|e| QuarryError::StorageError(format!("Failed to commit: {e}")))
        });

        if let Err(e) = &result {
            tracing::warn!("Rolling back document store: {}", e);
            if let Err(rollback) = writer.rollback() {
                tracing::error!("Rollback failed: {}", rollback);
            }
        }

        result
    }
}

impl PersistenceGateway for TantivyStore {
    fn add_documents(&self, batch: &[DocumentData]) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        // Serialize first so a bad entry never reaches the writer
        let documents = batch
            .iter()
            .map(|data| self.to_tantivy(data))
            .collect::<Result<Vec<_>>>()?;

        self.transact(|writer| {
            for (data, document) in batch.iter().zip(documents) {
                writer.delete_term(Term::from_field_text(self.fields.path, &data.path));
                writer.add_document(document).map_err(|e| {
                    QuarryError::StorageError(format!("Failed to add {}: {e}", data.path))
                })?;
            }
            Ok(())
        })?;

        tracing::debug!("Committed {} documents to {:?}", batch.len(), self.dir);
        Ok(())
    }

    fn remove_documents(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }

        self.transact(|writer| {
            for path in paths {
                writer.delete_term(Term::from_field_text(self.fields.path, path));
            }
            Ok(())
        })
    }

    fn load_index_data(&self) -> Result<(DocumentIndex, DocumentFrequency)> {
        let searcher = self.reader()?.searcher();
        let addresses = searcher
            .search(&AllQuery, &DocSetCollector)
            .map_err(|e| QuarryError::StorageError(format!("Failed to scan store: {e}")))?;

        let mut documents = DocumentIndex::with_capacity(addresses.len());
        for address in addresses {
            let stored: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| QuarryError::StorageError(format!("Doc retrieval failed: {e}")))?;
            let (path, document) = self.from_tantivy(&stored)?;
            documents.insert(path, document);
        }

        let frequencies = frequencies_of(&documents);
        tracing::info!(
            "Loaded {} documents ({} terms) from {:?}",
            documents.len(),
            frequencies.len(),
            self.dir
        );

        Ok((documents, frequencies))
    }

    fn close(&self) -> Result<()> {
        let Some(writer) = self.writer.lock().take() else {
            return Ok(());
        };
        writer
            .wait_merging_threads()
            .map_err(|e| QuarryError::StorageError(format!("Failed to close writer: {e}")))
    }
}
