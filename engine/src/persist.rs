//! Flat TSV snapshots of a document collection: one row per document with
//! the common fields plus the kind tag. Per-source extras are not stored;
//! loading replays rows through the document factory, which fills defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::corpus::Corpus;
use crate::document::Document;

#[derive(Serialize)]
struct RowOut<'a> {
    id: u32,
    title: &'a str,
    author: &'a str,
    date: &'a str,
    url: &'a str,
    text: String,
    kind: &'a str,
}

#[derive(Deserialize)]
struct RowIn {
    #[allow(dead_code)]
    id: u32,
    title: String,
    author: String,
    date: String,
    url: String,
    text: String,
    kind: String,
}

/// Flatten whitespace so a text field stays on one tab-separated row.
fn flatten_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn save_corpus<P: AsRef<Path>>(corpus: &Corpus, path: P) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path.as_ref())
        .with_context(|| format!("creating {}", path.as_ref().display()))?;
    for (id, doc) in corpus.iter() {
        writer.serialize(RowOut {
            id,
            title: &doc.title,
            author: &doc.author,
            date: &doc.date,
            url: &doc.url,
            text: flatten_ws(&doc.text),
            kind: doc.kind(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Load a snapshot into a fresh corpus. Ids are reassigned densely in row
/// order, which matches the order they were written in.
pub fn load_corpus<P: AsRef<Path>>(path: P, name: &str) -> Result<Corpus> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;
    let mut corpus = Corpus::new(name);
    for record in reader.deserialize::<RowIn>() {
        let row = record.context("malformed corpus row")?;
        corpus.add_document(Document::from_kind(
            &row.kind, row.title, row.author, row.date, row.url, row.text,
        ));
    }
    Ok(corpus)
}
