//! Tests for the remove command

use crate::cli::test_helpers::{create_cli_test_config, reopen, setup_indexed_store};
use crate::common::TestRepo;
use quarry::cli::commands::remove::{execute, RemoveArgs};
use quarry::cli::OutputFormat;

/// Test removing an indexed document
#[test]
fn test_remove_indexed_document() {
    let (config, _storage) = create_cli_test_config();
    let repo = TestRepo::small();
    setup_indexed_store(&config, &repo);

    let args = RemoveArgs {
        path: repo.path().join("notes/cats.txt"),
    };
    let result = execute(args, config.clone(), OutputFormat::Human);
    assert!(result.is_ok(), "Remove should succeed: {:?}", result.err());

    let services = reopen(&config);
    assert_eq!(services.model.document_count(), 5);
}

/// A document whose file is already deleted can still be removed
#[test]
fn test_remove_deleted_file() {
    let (config, _storage) = create_cli_test_config();
    let repo = TestRepo::with_files(&[("a.txt", "apple"), ("b.txt", "banana")]);
    setup_indexed_store(&config, &repo);

    // canonicalize() fails once the file is gone, so the raw path must match
    let path = repo.path().canonicalize().unwrap().join("a.txt");
    std::fs::remove_file(&path).unwrap();

    let result = execute(RemoveArgs { path }, config.clone(), OutputFormat::Json);
    assert!(result.is_ok(), "Remove should succeed: {:?}", result.err());
    assert_eq!(reopen(&config).model.document_count(), 1);
}

/// Test removing a path that was never indexed
#[test]
fn test_remove_unknown_document() {
    let (config, _storage) = create_cli_test_config();
    let repo = TestRepo::with_files(&[("a.txt", "apple")]);
    setup_indexed_store(&config, &repo);

    let args = RemoveArgs {
        path: repo.path().join("never-indexed.txt"),
    };
    let result = execute(args, config.clone(), OutputFormat::Human);

    let message = result.unwrap_err().to_string();
    assert!(message.contains("not in the index"), "Unexpected error: {message}");
    assert_eq!(reopen(&config).model.document_count(), 1);
}
