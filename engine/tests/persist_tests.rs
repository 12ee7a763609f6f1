use engine::persist::{load_corpus, save_corpus};
use engine::{Corpus, Document, Source};

#[test]
fn tsv_round_trip_preserves_rows_and_order() {
    let mut corpus = Corpus::new("snapshot");
    corpus.add_document(Document::new(
        "Plain one",
        "ada",
        "2024-01-01",
        "https://example.com/1",
        "some plain text",
    ));
    corpus.add_document(Document::reddit(
        "Reddit post",
        "bob",
        "2024-02-02",
        "https://reddit.com/r/x",
        "line one\nline two",
        42,
    ));
    corpus.add_document(Document::arxiv(
        "Arxiv paper",
        "carol",
        "2024-03-03",
        "https://arxiv.org/abs/1",
        "an abstract\twith a tab",
        vec!["dave".into()],
    ));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corpus.tsv");
    save_corpus(&corpus, &path).unwrap();
    let loaded = load_corpus(&path, "reloaded").unwrap();

    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded.name(), "reloaded");
    let first = loaded.get(0).unwrap();
    assert_eq!(first.title, "Plain one");
    assert_eq!(first.author, "ada");
    assert_eq!(first.source, Source::Plain);

    // kind tags survive; per-source extras are not part of the flat format
    let reddit = loaded.get(1).unwrap();
    assert_eq!(reddit.kind(), "reddit");
    assert_eq!(reddit.source, Source::Reddit { num_comments: 0 });
    // embedded newlines and tabs were flattened to spaces
    assert_eq!(reddit.text, "line one line two");
    let arxiv = loaded.get(2).unwrap();
    assert_eq!(arxiv.kind(), "arxiv");
    assert_eq!(arxiv.text, "an abstract with a tab");
}

#[test]
fn empty_corpus_round_trips() {
    let corpus = Corpus::new("empty");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.tsv");
    save_corpus(&corpus, &path).unwrap();
    let loaded = load_corpus(&path, "empty").unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn loading_a_missing_file_is_an_error() {
    assert!(load_corpus("/nonexistent/corpus.tsv", "x").is_err());
}
