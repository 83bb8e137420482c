//! In-memory persistence gateway.
//!
//! Keeps committed documents in a map. Useful for tests and for
//! ephemeral runs that should not touch the data directory. Writes can
//! be made to fail on demand to exercise retry paths.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::core::error::{QuarryError, Result};
use crate::core::model::{frequencies_of, Document, DocumentFrequency, DocumentIndex};
use crate::core::storage::PersistenceGateway;
use crate::core::types::DocumentData;

#[derive(Debug, Default)]
struct MemoryState {
    documents: DocumentIndex,
    closed: bool,
}

/// In-memory document store
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    /// Writes that will fail before the store behaves again
    failing_writes: AtomicUsize,
    commits: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` write calls fail without side effects
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Number of committed documents
    pub fn document_count(&self) -> usize {
        self.state.lock().documents.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.state.lock().documents.contains_key(path)
    }

    /// Number of successful write calls
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    fn writable(&self) -> Result<parking_lot::MutexGuard<'_, MemoryState>> {
        let injected = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(QuarryError::StorageError("injected write failure".into()));
        }

        let state = self.state.lock();
        if state.closed {
            return Err(QuarryError::StorageError("Document store is closed".into()));
        }
        Ok(state)
    }
}

impl PersistenceGateway for MemoryStore {
    fn add_documents(&self, batch: &[DocumentData]) -> Result<()> {
        let mut state = self.writable()?;
        for data in batch {
            state
                .documents
                .insert(data.path.clone(), Document::from_terms(&data.terms));
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("Memory store committed {} documents", batch.len());
        Ok(())
    }

    fn remove_documents(&self, paths: &[String]) -> Result<()> {
        let mut state = self.writable()?;
        for path in paths {
            state.documents.remove(path);
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load_index_data(&self) -> Result<(DocumentIndex, DocumentFrequency)> {
        let documents = self.state.lock().documents.clone();
        let frequencies = frequencies_of(&documents);
        Ok((documents, frequencies))
    }

    fn close(&self) -> Result<()> {
        self.state.lock().closed = true;
        Ok(())
    }
}
