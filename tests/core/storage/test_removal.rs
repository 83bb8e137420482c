// Removing documents keeps the model and the store in agreement

use std::sync::Arc;

use crate::common::{create_test_services, test_config, TestRepo};
use quarry::core::search::idf;
use quarry::core::services::Services;
use quarry::core::storage::MemoryStore;

#[test]
fn test_remove_updates_scores() {
    let repo = TestRepo::with_files(&[
        ("a.txt", "cat dog dog"),
        ("b.txt", "dog bird"),
        ("c.txt", "bird bird bird"),
    ]);
    let (services, _storage) = create_test_services();
    services.index_dir(repo.path()).unwrap();

    services.remove_file(&repo.key("a.txt")).unwrap();

    assert_eq!(services.model.document_count(), 2);
    assert_eq!(services.model.document_frequency("cat"), 0);
    assert_eq!(services.model.document_frequency("dog"), 1);

    let results = services.search_query("dog");
    assert_eq!(results[0].path, repo.key("b.txt"));
    assert!((results[0].score - 0.5 * idf(2, 1)).abs() < 1e-12);
    services.model.check_consistency().unwrap();
}

#[test]
fn test_removal_survives_reload() {
    let repo = TestRepo::with_files(&[("a.txt", "apple"), ("b.txt", "banana")]);
    let (services, _storage) = create_test_services();
    services.index_dir(repo.path()).unwrap();
    services.remove_file(&repo.key("a.txt")).unwrap();
    services.close().unwrap();

    let reloaded = Services::new((*services.config).clone()).unwrap();
    assert_eq!(reloaded.load().unwrap(), 1);
    assert!(!reloaded.model.contains(&repo.key("a.txt")));
    assert!(reloaded.model.contains(&repo.key("b.txt")));
}

#[test]
fn test_remove_unknown_path_is_not_found() {
    let (services, _storage) = create_test_services();

    let err = services.remove_file("/nowhere/missing.txt").unwrap_err();

    assert!(err.is_not_found());
}

#[test]
fn test_failed_store_removal_reinstates_document() {
    let repo = TestRepo::with_files(&[("a.txt", "apple"), ("b.txt", "banana")]);
    let store = Arc::new(MemoryStore::new());
    let services = Services::with_store(test_config(), store.clone()).unwrap();
    services.index_dir(repo.path()).unwrap();
    let before = services.model.snapshot();

    store.fail_next_writes(1);
    assert!(services.remove_file(&repo.key("a.txt")).is_err());

    assert_eq!(services.model.snapshot(), before);
    assert!(store.contains(&repo.key("a.txt")));

    services.remove_file(&repo.key("a.txt")).unwrap();
    assert!(!store.contains(&repo.key("a.txt")));
}

#[test]
fn test_remove_drops_pending_entries() {
    let repo = TestRepo::with_files(&[("a.txt", "apple"), ("b.txt", "banana")]);
    let store = Arc::new(MemoryStore::new());
    let services = Services::with_store(test_config(), store.clone()).unwrap();

    store.fail_next_writes(1);
    assert!(services.index_dir(repo.path()).is_err());
    assert_eq!(services.pending_documents().len(), 2);

    services.remove_file(&repo.key("a.txt")).unwrap();
    assert_eq!(services.pending_documents().len(), 1);

    // The retry commits only what is still indexed
    assert_eq!(services.flush().unwrap(), 1);
    assert!(!store.contains(&repo.key("a.txt")));
    assert!(store.contains(&repo.key("b.txt")));
}

#[test]
fn test_failed_removal_keeps_unsaved_document_queued() {
    let repo = TestRepo::with_files(&[("a.txt", "apple")]);
    let store = Arc::new(MemoryStore::new());
    let services = Services::with_store(test_config(), store.clone()).unwrap();

    store.fail_next_writes(1);
    assert!(services.index_dir(repo.path()).is_err());
    assert_eq!(services.pending_documents().len(), 1);

    store.fail_next_writes(1);
    assert!(services.remove_file(&repo.key("a.txt")).is_err());

    assert!(services.model.contains(&repo.key("a.txt")));
    assert_eq!(services.pending_documents().len(), 1);
    assert_eq!(services.flush().unwrap(), 1);
    assert!(store.contains(&repo.key("a.txt")));
    assert_eq!(store.document_count(), services.model.document_count());
}
