//! Unified service container for quarry
//!
//! Ties the index model, the pipeline, the scorer and the
//! persistence gateway together behind the operations the CLI uses.

use std::path::Path;
use std::sync::Arc;

use crate::core::config::Config;
use crate::core::error::{QuarryError, Result};
use crate::core::indexer::{BatchBuffer, CancellationToken, IndexingPipeline};
use crate::core::model::{check_invariants, IndexModel};
use crate::core::search::SearchService;
use crate::core::storage::{MemoryStore, PersistenceGateway, TantivyStore};
use crate::core::types::{DocumentData, IndexStats, IndexSummary, SearchResult};

/// Unified services container
///
/// Clones share the same model, store and pending batch.
#[derive(Clone)]
pub struct Services {
    /// In-memory index shared by pipeline and scorer
    pub model: Arc<IndexModel>,

    /// TF-IDF search over `model`
    pub search: Arc<SearchService>,

    /// Durable document store
    pub store: Arc<dyn PersistenceGateway>,

    /// Application configuration
    pub config: Arc<Config>,

    pipeline: Arc<IndexingPipeline>,

    /// Documents not yet committed; survives across runs for replay
    buffer: Arc<BatchBuffer>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("documents", &self.model.document_count())
            .field("pending", &self.buffer.len())
            .finish()
    }
}

impl Services {
    /// Create services backed by the tantivy store at
    /// `config.storage.index_dir`
    pub fn new(config: Config) -> Result<Self> {
        let store = TantivyStore::open(&config.storage.index_dir)?;
        tracing::debug!("Opened document store at {:?}", store.dir());
        Self::with_store(config, Arc::new(store))
    }

    /// Create services that keep everything in memory
    pub fn ephemeral(config: Config) -> Result<Self> {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    /// Create services over an explicit store
    pub fn with_store(config: Config, store: Arc<dyn PersistenceGateway>) -> Result<Self> {
        config.validate()?;

        let pipeline = IndexingPipeline::new(&config.indexing)?;
        let model = Arc::new(IndexModel::new());
        let search = Arc::new(SearchService::new(
            Arc::clone(&model),
            pipeline.normalizer().clone(),
            config.search.default_k,
            config.search.max_k,
            config.search.max_query_length,
        ));
        let buffer = Arc::new(BatchBuffer::new(config.indexing.batch_size));

        Ok(Self {
            model,
            search,
            store,
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            buffer,
        })
    }

    /// Rehydrate the index model from the store
    ///
    /// # Returns
    ///
    /// The number of documents loaded, or `StorageError` if the stored
    /// data is inconsistent
    pub fn load(&self) -> Result<usize> {
        let (documents, frequencies) = self.store.load_index_data()?;
        check_invariants(&documents, &frequencies)
            .map_err(|e| QuarryError::StorageError(format!("Stored index is inconsistent: {e}")))?;
        let count = documents.len();
        self.model.replace_all(documents, frequencies);
        Ok(count)
    }

    /// Index every supported file under `root` and persist it
    pub fn index_dir(&self, root: &Path) -> Result<IndexStats> {
        self.index_dir_with_cancel(root, &CancellationToken::new())
    }

    /// Like [`Services::index_dir`], stopping traversal once `cancel`
    /// fires
    pub fn index_dir_with_cancel(
        &self,
        root: &Path,
        cancel: &CancellationToken,
    ) -> Result<IndexStats> {
        self.pipeline.run(
            root,
            &self.model,
            &self.buffer,
            self.store.as_ref(),
            cancel,
        )
    }

    /// Rank every indexed document against `text`
    pub fn search_query(&self, text: &str) -> Vec<SearchResult> {
        self.search.search(text)
    }

    /// Best `k` documents for `text`
    pub fn search_top(&self, text: &str, k: Option<usize>) -> Vec<SearchResult> {
        self.search.search_top(text, k)
    }

    /// Remove a document from the model and the store
    ///
    /// If the store rejects the removal the document is reinstated and
    /// any uncommitted entry for it stays queued for the next flush.
    pub fn remove_file(&self, path: &str) -> Result<()> {
        let removed = self.model.remove(path)?;

        // Pending entries stay buffered until the store has agreed
        if let Err(e) = self.store.remove_documents(&[path.to_string()]) {
            tracing::warn!("Store rejected removal of {}: {}", path, e);
            self.model.upsert(path, removed);
            return Err(e);
        }
        let discarded = self.buffer.discard(path);

        tracing::info!(
            "Removed {} ({} pending entries dropped)",
            path,
            discarded
        );
        Ok(())
    }

    /// Retry committing documents left over from a failed flush
    pub fn flush(&self) -> Result<usize> {
        self.buffer.flush(self.store.as_ref())
    }

    /// Documents indexed but not yet committed
    pub fn pending_documents(&self) -> Vec<DocumentData> {
        self.buffer.pending()
    }

    /// Document, term and occurrence totals of the model
    pub fn summary(&self) -> IndexSummary {
        self.model.summary()
    }

    /// Close the store
    pub fn close(&self) -> Result<()> {
        if !self.buffer.is_empty() {
            tracing::warn!(
                "Closing with {} uncommitted documents",
                self.buffer.len()
            );
        }
        self.store.close()
    }
}
