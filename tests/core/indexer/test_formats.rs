// Format dispatch through the full pipeline: each supported format
// contributes its text, broken files are counted and never abort a run.

use crate::common::{create_ephemeral_services, TestRepo};

#[test]
fn test_markup_contributes_text_only() {
    let repo = TestRepo::with_files(&[
        (
            "page.html",
            "<html><head><style>body { color: red; }</style></head>\
             <body><p>Quarry ranks notes</p><br></body></html>",
        ),
        (
            "feed.xml",
            "<?xml version=\"1.0\"?><feed><title>Quarry &amp; notes</title></feed>",
        ),
    ]);
    let services = create_ephemeral_services();

    let stats = services.index_dir(repo.path()).unwrap();
    assert_eq!(stats.files_indexed, 2);

    let page = services.model.document(&repo.key("page.html")).unwrap();
    assert_eq!(page.count("quarri"), 1);
    assert_eq!(page.count("note"), 1);
    assert_eq!(page.count("p"), 0);
    assert_eq!(page.count("color"), 0);

    let feed = services.model.document(&repo.key("feed.xml")).unwrap();
    assert_eq!(feed.count("&"), 1);
    assert_eq!(feed.count("feed"), 0);
}

#[test]
fn test_broken_files_are_counted_as_failed() {
    let repo = TestRepo::with_files(&[
        ("good.txt", "fine content"),
        ("broken.xml", "<a><b></a>"),
        ("broken.pdf", "this is not a pdf"),
    ]);
    let services = create_ephemeral_services();

    let stats = services.index_dir(repo.path()).unwrap();

    assert_eq!(stats.files_discovered, 3);
    assert_eq!(stats.files_indexed, 1);
    assert_eq!(stats.files_failed, 2);
    assert!(stats.is_complete());
    assert_eq!(services.model.document_count(), 1);
}

#[test]
fn test_invalid_utf8_text_is_decoded_lossily() {
    let repo = TestRepo::with_files(&[]);
    std::fs::write(repo.path().join("latin1.txt"), b"caf\xe9 menu").unwrap();
    let services = create_ephemeral_services();

    let stats = services.index_dir(repo.path()).unwrap();

    assert_eq!(stats.files_indexed, 1);
    let doc = services.model.document(&repo.key("latin1.txt")).unwrap();
    assert_eq!(doc.count("menu"), 1);
    assert_eq!(doc.count("\u{FFFD}"), 1);
}

#[test]
fn test_empty_file_is_indexed_with_no_terms() {
    let repo = TestRepo::with_files(&[("empty.txt", ""), ("full.txt", "words here")]);
    let services = create_ephemeral_services();

    services.index_dir(repo.path()).unwrap();

    let empty = services.model.document(&repo.key("empty.txt")).unwrap();
    assert_eq!(empty.total_terms, 0);

    // An empty document never matches but does not break scoring
    let results = services.search_query("word");
    assert_eq!(results[0].path, repo.key("full.txt"));
    assert_eq!(results[1].score, 0.0);
}
