//! Indexing pipeline orchestration.
//!
//! One producer thread walks the tree and feeds a bounded queue; a
//! fixed pool of workers decodes, tokenizes and installs each file in
//! the [`IndexModel`], then appends it to the shared [`BatchBuffer`].
//! Full batches are flushed to the persistence gateway as they fill,
//! and whatever remains is flushed once the workers are done.
//!
//! The bounded queue is the only backpressure: a slow worker pool
//! stalls the walker instead of buffering the whole tree.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver};
use parking_lot::Mutex;

use crate::core::config::IndexingConfig;
use crate::core::error::{QuarryError, Result};
use crate::core::indexer::decoder::{Decoder, DecoderRegistry};
use crate::core::indexer::tokenizer::{tokenize_chars, TermNormalizer};
use crate::core::indexer::walker::FileWalker;
use crate::core::model::{Document, IndexModel};
use crate::core::storage::PersistenceGateway;
use crate::core::types::{DocumentData, IndexOutcome, IndexStats};

/// Cooperative stop signal for an indexing run
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the producer to stop at the next path
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Documents waiting to be committed to the store
///
/// Appending and flushing share one critical section, so an entry is
/// never lost between a successful commit and the clear. A failed
/// commit leaves every entry in place for the next attempt.
#[derive(Debug)]
pub struct BatchBuffer {
    entries: Mutex<Vec<DocumentData>>,
    batch_size: usize,
}

impl BatchBuffer {
    /// Create a buffer that flushes once `batch_size` entries are held
    pub fn new(batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            entries: Mutex::new(Vec::with_capacity(batch_size)),
            batch_size,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Append `document`, flushing if the batch is full
    ///
    /// # Returns
    ///
    /// The number of documents committed (0 when no flush happened)
    pub fn push(&self, document: DocumentData, store: &dyn PersistenceGateway) -> Result<usize> {
        let mut entries = self.entries.lock();
        entries.push(document);
        if entries.len() < self.batch_size {
            return Ok(0);
        }
        commit(&mut entries, store)
    }

    /// Commit everything held, as one transaction
    ///
    /// # Returns
    ///
    /// The number of documents committed, or `PersistenceError` naming
    /// the retained paths
    pub fn flush(&self, store: &dyn PersistenceGateway) -> Result<usize> {
        let mut entries = self.entries.lock();
        if entries.is_empty() {
            return Ok(0);
        }
        commit(&mut entries, store)
    }

    /// Drop uncommitted entries for `path`
    ///
    /// # Returns
    ///
    /// The number of entries dropped
    pub fn discard(&self, path: &str) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|entry| entry.path != path);
        before - entries.len()
    }

    /// Copy of the entries not yet committed
    pub fn pending(&self) -> Vec<DocumentData> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

fn commit(entries: &mut Vec<DocumentData>, store: &dyn PersistenceGateway) -> Result<usize> {
    match store.add_documents(&entries[..]) {
        Ok(()) => {
            let committed = entries.len();
            entries.clear();
            tracing::info!("Flushed batch of {} documents", committed);
            Ok(committed)
        }
        Err(e) => {
            tracing::warn!(
                "Batch flush failed, retaining {} documents: {}",
                entries.len(),
                e
            );
            Err(QuarryError::PersistenceError {
                message: e.to_string(),
                pending: entries.iter().map(|d| d.path.clone()).collect(),
            })
        }
    }
}

/// Per-run counters shared by the workers
#[derive(Debug, Default)]
struct RunCounters {
    indexed: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    persisted: AtomicUsize,
    batches: AtomicUsize,
}

impl RunCounters {
    fn record_commit(&self, committed: usize) {
        if committed > 0 {
            self.persisted.fetch_add(committed, Ordering::Relaxed);
            self.batches.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Orchestrates the indexing pipeline
#[derive(Debug, Clone)]
pub struct IndexingPipeline {
    walker: FileWalker,
    registry: DecoderRegistry,
    normalizer: TermNormalizer,
    workers: usize,
    queue_capacity: usize,
}

impl IndexingPipeline {
    /// Create a pipeline from the indexing configuration
    ///
    /// # Returns
    ///
    /// A new `IndexingPipeline`, or `ConfigError` for invalid glob
    /// patterns
    pub fn new(config: &IndexingConfig) -> Result<Self> {
        let walker = FileWalker::new(
            config.include_patterns.clone(),
            config.exclude_patterns.clone(),
            config.max_file_size_mb,
        )?;

        Ok(Self {
            walker,
            registry: DecoderRegistry::new(),
            normalizer: TermNormalizer::new(&config.language),
            workers: config.workers.max(1),
            queue_capacity: config.queue_capacity.max(1),
        })
    }

    /// Normalizer shared with the query side
    pub fn normalizer(&self) -> &TermNormalizer {
        &self.normalizer
    }

    /// Index every supported file under `root`
    ///
    /// Per-file decode failures are logged and counted. The final
    /// flush runs even when the run was cancelled.
    ///
    /// # Returns
    ///
    /// Run statistics, `ConfigError` for a bad root, or
    /// `PersistenceError` if documents are still pending after the
    /// final flush
    pub fn run(
        &self,
        root: &Path,
        model: &IndexModel,
        buffer: &BatchBuffer,
        store: &dyn PersistenceGateway,
        cancel: &CancellationToken,
    ) -> Result<IndexStats> {
        let start = Instant::now();
        let counters = RunCounters::default();
        let (sender, receiver) = bounded(self.queue_capacity);

        tracing::info!(
            "Indexing {:?} with {} workers (queue {}, batch {})",
            root,
            self.workers,
            self.queue_capacity,
            buffer.batch_size()
        );

        let traversal = std::thread::scope(|scope| {
            for _ in 0..self.workers {
                let receiver = receiver.clone();
                let counters = &counters;
                scope.spawn(move || self.work(receiver, model, buffer, store, counters));
            }
            drop(receiver);

            let producer = scope.spawn(move || {
                let mut interrupted = false;
                let walked = self.walker.walk(root, |path| {
                    if cancel.is_cancelled() {
                        interrupted = true;
                        return false;
                    }
                    sender.send(path).is_ok()
                });
                // Dropping the sender closes the queue for the workers
                drop(sender);
                walked.map(|sent| (sent, interrupted))
            });

            producer
                .join()
                .unwrap_or_else(|_| Err(QuarryError::StorageError("walker thread panicked".into())))
        });

        let (files_discovered, interrupted) = traversal?;

        let committed = buffer.flush(store)?;
        counters.record_commit(committed);

        let outcome = if interrupted {
            tracing::warn!("Indexing cancelled after {} files", files_discovered);
            IndexOutcome::Cancelled
        } else {
            IndexOutcome::Completed
        };

        let stats = IndexStats {
            files_discovered,
            files_indexed: counters.indexed.load(Ordering::Relaxed),
            files_skipped: counters.skipped.load(Ordering::Relaxed),
            files_failed: counters.failed.load(Ordering::Relaxed),
            documents_persisted: counters.persisted.load(Ordering::Relaxed),
            batches_flushed: counters.batches.load(Ordering::Relaxed),
            duration_ms: start.elapsed().as_millis() as u64,
            outcome,
        };

        tracing::info!(
            "Indexing finished: {} indexed, {} skipped, {} failed, \
             {} documents in {} batches, {}ms",
            stats.files_indexed,
            stats.files_skipped,
            stats.files_failed,
            stats.documents_persisted,
            stats.batches_flushed,
            stats.duration_ms
        );

        Ok(stats)
    }

    /// Worker loop: runs until the queue is closed and drained
    fn work(
        &self,
        receiver: Receiver<std::path::PathBuf>,
        model: &IndexModel,
        buffer: &BatchBuffer,
        store: &dyn PersistenceGateway,
        counters: &RunCounters,
    ) {
        for path in receiver {
            let Some(format) = self.registry.get_for_file(&path) else {
                tracing::warn!("Skipping unsupported file: {:?}", path);
                counters.skipped.fetch_add(1, Ordering::Relaxed);
                continue;
            };

            let chars = match format.decode(&path) {
                Ok(chars) => chars,
                Err(e) => {
                    tracing::warn!("{}", e);
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    continue;
                }
            };

            let terms = tokenize_chars(&chars, &self.normalizer);
            let key = path.to_string_lossy().into_owned();
            model.upsert(&key, Document::from_terms(&terms));

            let done = counters.indexed.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::debug!("Indexed {:?} ({} terms)", path, terms.len());
            if done % 100 == 0 {
                tracing::info!("Progress: {} files indexed", done);
            }

            match buffer.push(DocumentData { path: key, terms }, store) {
                Ok(committed) => counters.record_commit(committed),
                // Entries stay buffered; the next flush retries them
                Err(e) => tracing::warn!("{}", e),
            }
        }
    }
}
