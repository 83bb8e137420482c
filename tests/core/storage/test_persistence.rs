// Integration tests for the tantivy document store

use crate::common::{assert_valid_stats, create_test_services, test_config, TestRepo};
use quarry::core::services::Services;
use quarry::core::storage::{PersistenceGateway, TantivyStore};
use quarry::DocumentData;

fn reopen(config: &quarry::Config) -> Services {
    let services = Services::new(config.clone()).expect("Failed to reopen store");
    services.load().expect("Failed to load store");
    services
}

#[test]
fn test_index_persists_and_reloads() {
    let repo = TestRepo::small();
    let (services, _storage) = create_test_services();

    let stats = services.index_dir(repo.path()).unwrap();
    assert_valid_stats(&stats);
    let before = services.model.snapshot();
    services.close().unwrap();

    let reloaded = reopen(&services.config);

    assert_eq!(reloaded.model.snapshot(), before);
    assert_eq!(reloaded.summary(), services.summary());
    reloaded.model.check_consistency().unwrap();
}

#[test]
fn test_reloaded_index_ranks_identically() {
    let repo = TestRepo::medium();
    let (services, _storage) = create_test_services();
    services.index_dir(repo.path()).unwrap();
    let expected = services.search_query("unique12 shared");
    services.close().unwrap();

    let reloaded = reopen(&services.config);

    assert_eq!(reloaded.search_query("unique12 shared"), expected);
}

#[test]
fn test_reindex_overwrites_stored_document() {
    let repo = TestRepo::with_files(&[("a.txt", "apple")]);
    let (services, _storage) = create_test_services();
    services.index_dir(repo.path()).unwrap();

    repo.write("a.txt", "banana banana");
    services.index_dir(repo.path()).unwrap();
    services.close().unwrap();

    let reloaded = reopen(&services.config);
    let doc = reloaded.model.document(&repo.key("a.txt")).unwrap();
    assert_eq!(reloaded.model.document_count(), 1);
    assert_eq!(doc.total_terms, 2);
    assert_eq!(doc.count("banana"), 2);
    assert_eq!(doc.count("appl"), 0);
}

#[test]
fn test_store_direct_round_trip() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = TantivyStore::open(dir.path()).unwrap();

    store
        .add_documents(&[
            DocumentData {
                path: "/x".to_string(),
                terms: vec!["a".into(), "b".into(), "a".into()],
            },
            DocumentData {
                path: "/y".to_string(),
                terms: vec![],
            },
        ])
        .unwrap();
    assert_eq!(store.document_count().unwrap(), 2);

    let (documents, frequencies) = store.load_index_data().unwrap();
    assert_eq!(documents["/x"].count("a"), 2);
    assert_eq!(documents["/x"].total_terms, 3);
    assert_eq!(documents["/y"].total_terms, 0);
    assert_eq!(frequencies.get("a"), Some(&1));
    assert_eq!(frequencies.get("b"), Some(&1));

    store.close().unwrap();
    assert!(store
        .add_documents(&[DocumentData {
            path: "/z".to_string(),
            terms: vec![],
        }])
        .is_err());
}

#[test]
fn test_empty_store_loads_nothing() {
    let (services, _storage) = create_test_services();

    assert_eq!(services.load().unwrap(), 0);
    assert_eq!(services.model.document_count(), 0);
    assert!(services.search_query("anything").is_empty());
}

#[test]
fn test_ephemeral_services_do_not_touch_disk() {
    let repo = TestRepo::with_files(&[("a.txt", "apple")]);
    let storage = tempfile::TempDir::new().unwrap();
    let mut config = test_config();
    config.storage.index_dir = storage.path().join("index");

    let services = Services::ephemeral(config).unwrap();
    services.index_dir(repo.path()).unwrap();
    services.close().unwrap();

    assert!(!storage.path().join("index").exists());
}
