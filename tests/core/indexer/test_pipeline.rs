// Integration tests for the concurrent indexing pipeline

use std::sync::Arc;

use crate::common::{assert_valid_stats, create_ephemeral_services, test_config, TestRepo};
use quarry::core::indexer::CancellationToken;
use quarry::core::model::{DocumentFrequency, DocumentIndex};
use quarry::core::services::Services;
use quarry::core::storage::{MemoryStore, PersistenceGateway};
use quarry::{DocumentData, IndexOutcome, QuarryError, Result};

/// Store that fires a cancellation token on its first commit
struct CancelOnCommit {
    inner: MemoryStore,
    cancel: CancellationToken,
}

impl PersistenceGateway for CancelOnCommit {
    fn add_documents(&self, batch: &[DocumentData]) -> Result<()> {
        self.inner.add_documents(batch)?;
        self.cancel.cancel();
        Ok(())
    }

    fn remove_documents(&self, paths: &[String]) -> Result<()> {
        self.inner.remove_documents(paths)
    }

    fn load_index_data(&self) -> Result<(DocumentIndex, DocumentFrequency)> {
        self.inner.load_index_data()
    }

    fn close(&self) -> Result<()> {
        self.inner.close()
    }
}

#[test]
fn test_index_small_repository() {
    let repo = TestRepo::small();
    let services = create_ephemeral_services();

    let stats = services.index_dir(repo.path()).unwrap();

    assert_valid_stats(&stats);
    assert_eq!(stats.files_discovered, 8);
    assert_eq!(stats.files_indexed, 6);
    assert_eq!(stats.files_skipped, 2);
    assert_eq!(stats.files_failed, 0);
    assert_eq!(services.model.document_count(), 6);
    assert!(!services.model.contains(&repo.key("src/main.rs")));
    assert!(!services.model.contains(&repo.key("image.png")));
}

#[test]
fn test_index_medium_repository_in_batches() {
    let repo = TestRepo::medium();
    let services = create_ephemeral_services();

    let stats = services.index_dir(repo.path()).unwrap();

    assert_valid_stats(&stats);
    assert_eq!(stats.files_indexed, 50);
    // Batch size 3: 16 full batches during the run plus the final flush
    assert_eq!(stats.batches_flushed, 17);
    assert!(services.pending_documents().is_empty());
    assert_eq!(services.model.document_frequency("share"), 50);
    services.model.check_consistency().unwrap();
}

#[test]
fn test_index_with_include_patterns() {
    let repo = TestRepo::small();
    let mut config = test_config();
    config.indexing.include_patterns = vec!["*.txt".to_string()];
    let services = Services::ephemeral(config).unwrap();

    let stats = services.index_dir(repo.path()).unwrap();

    assert_eq!(stats.files_discovered, 2);
    assert_eq!(stats.files_indexed, 2);
    assert!(services.model.contains(&repo.key("notes/cats.txt")));
    assert!(services.model.contains(&repo.key("notes/dogs.txt")));
}

#[test]
fn test_index_with_exclude_patterns() {
    let repo = TestRepo::small();
    let mut config = test_config();
    config.indexing.exclude_patterns = vec!["**/notes/**".to_string()];
    let services = Services::ephemeral(config).unwrap();

    services.index_dir(repo.path()).unwrap();

    assert!(!services.model.contains(&repo.key("notes/cats.txt")));
    assert!(services.model.contains(&repo.key("README.md")));
}

#[test]
fn test_hidden_directories_are_skipped() {
    let repo = TestRepo::with_files(&[
        ("visible.txt", "shown"),
        (".cache/hidden.txt", "secret"),
    ]);
    let services = create_ephemeral_services();

    let stats = services.index_dir(repo.path()).unwrap();

    assert_eq!(stats.files_indexed, 1);
    assert!(!services.model.contains(&repo.key(".cache/hidden.txt")));
}

#[test]
fn test_reindex_replaces_documents() {
    let repo = TestRepo::with_files(&[("a.txt", "apple apple"), ("b.txt", "banana")]);
    let services = create_ephemeral_services();
    services.index_dir(repo.path()).unwrap();
    assert_eq!(services.model.document_frequency("appl"), 1);

    repo.write("a.txt", "cherry");
    services.index_dir(repo.path()).unwrap();

    assert_eq!(services.model.document_count(), 2);
    assert_eq!(services.model.document_frequency("appl"), 0);
    assert_eq!(services.model.document_frequency("cherri"), 1);
    services.model.check_consistency().unwrap();
}

#[test]
fn test_empty_directory() {
    let repo = TestRepo::with_files(&[]);
    let services = create_ephemeral_services();

    let stats = services.index_dir(repo.path()).unwrap();

    assert_eq!(stats.files_discovered, 0);
    assert_eq!(stats.files_indexed, 0);
    assert_eq!(stats.batches_flushed, 0);
    assert!(stats.is_complete());
}

#[test]
fn test_missing_root_is_config_error() {
    let repo = TestRepo::with_files(&[]);
    let services = create_ephemeral_services();

    let result = services.index_dir(&repo.path().join("does-not-exist"));

    assert!(matches!(result, Err(QuarryError::ConfigError(_))));
    assert_eq!(services.model.document_count(), 0);
}

#[test]
fn test_cancelled_run_flushes_what_was_indexed() {
    let repo = TestRepo::medium();
    let store = Arc::new(MemoryStore::new());
    let services = Services::with_store(test_config(), store.clone()).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let stats = services.index_dir_with_cancel(repo.path(), &cancel).unwrap();

    assert_eq!(stats.outcome, IndexOutcome::Cancelled);
    assert_eq!(stats.files_discovered, 0);
    assert_eq!(store.document_count(), services.model.document_count());
    assert!(services.pending_documents().is_empty());
}

#[test]
fn test_failed_flush_retains_documents_for_retry() {
    let repo = TestRepo::with_files(&[("a.txt", "apple"), ("b.txt", "banana")]);
    let store = Arc::new(MemoryStore::new());
    let services = Services::with_store(test_config(), store.clone()).unwrap();

    // Two documents never fill a batch of three; only the final flush writes
    store.fail_next_writes(1);
    let err = services.index_dir(repo.path()).unwrap_err();

    match &err {
        QuarryError::PersistenceError { pending, .. } => {
            let mut pending = pending.clone();
            pending.sort();
            assert_eq!(pending, vec![repo.key("a.txt"), repo.key("b.txt")]);
        }
        other => panic!("Expected PersistenceError, got {other:?}"),
    }
    assert_eq!(store.document_count(), 0);
    assert_eq!(services.model.document_count(), 2);
    assert_eq!(services.pending_documents().len(), 2);

    assert_eq!(services.flush().unwrap(), 2);
    assert_eq!(store.document_count(), 2);
    assert!(services.pending_documents().is_empty());
}

#[test]
fn test_concurrent_runs_share_one_model() {
    let first = TestRepo::medium();
    let second = TestRepo::small();
    let services = create_ephemeral_services();

    std::thread::scope(|scope| {
        let a = services.clone();
        let b = services.clone();
        let root_a = first.path();
        let root_b = second.path();
        scope.spawn(move || a.index_dir(root_a).unwrap());
        scope.spawn(move || b.index_dir(root_b).unwrap());
    });

    assert_eq!(services.model.document_count(), 56);
    services.model.check_consistency().unwrap();
}

#[test]
fn test_cancel_mid_run_drains_queue_and_flushes() {
    let repo = TestRepo::medium();
    let cancel = CancellationToken::new();
    let store = Arc::new(CancelOnCommit {
        inner: MemoryStore::new(),
        cancel: cancel.clone(),
    });

    // One worker and a one-slot queue keep the walker blocked behind it
    let mut config = test_config();
    config.indexing.workers = 1;
    config.indexing.queue_capacity = 1;
    config.indexing.batch_size = 1;
    let services = Services::with_store(config, store.clone()).unwrap();

    let stats = services.index_dir_with_cancel(repo.path(), &cancel).unwrap();

    assert_eq!(stats.outcome, IndexOutcome::Cancelled);
    assert!(stats.files_discovered >= 1);
    assert!(stats.files_discovered < 50, "walker was not stopped: {stats:?}");
    assert_eq!(stats.files_indexed, stats.files_discovered);
    assert_eq!(stats.documents_persisted, stats.files_indexed);
    assert_eq!(store.inner.document_count(), stats.files_indexed);
    assert_eq!(services.model.document_count(), stats.files_indexed);
    assert!(services.pending_documents().is_empty());
    services.model.check_consistency().unwrap();
}
