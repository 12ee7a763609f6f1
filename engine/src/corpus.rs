use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::document::Document;
use crate::lexical::{self, KwicEntry};
use crate::tokenizer::{tokenize, NormalizerConfig};
use crate::DocId;

/// Per-author bookkeeping: which documents an author contributed,
/// in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Author {
    pub name: String,
    pub doc_ids: Vec<DocId>,
}

impl Author {
    pub fn doc_count(&self) -> usize {
        self.doc_ids.len()
    }
}

/// One row of the corpus frequency table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStat {
    pub token: String,
    pub total_occurrences: u64,
    pub document_frequency: u32,
}

/// Listing order for [`Corpus::documents_sorted_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    Title,
}

/// Append-only, insertion-ordered document collection, the single source of
/// truth for everything derived from it.
///
/// Derived state (the concatenated lexical cache and the frequency table) is
/// rebuilt lazily: each cache remembers the generation it was built at, and
/// every append or normalization change bumps the generation. A search index
/// is a separate one-shot snapshot; rebuild it via [`crate::SearchEngine::build`]
/// after mutating the corpus.
#[derive(Debug, Clone)]
pub struct Corpus {
    name: String,
    docs: Vec<Document>,
    authors: IndexMap<String, Author>,
    normalizer: NormalizerConfig,
    generation: u64,
    full_text: Option<(u64, String)>,
    freq_table: Option<(u64, Vec<TokenStat>)>,
}

impl Corpus {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: Vec::new(),
            authors: IndexMap::new(),
            normalizer: NormalizerConfig::default(),
            generation: 0,
            full_text: None,
            freq_table: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a document and return its id. Ids are dense, start at 0 and
    /// are never reused; every derived cache becomes stale.
    pub fn add_document(&mut self, doc: Document) -> DocId {
        let id = self.docs.len() as DocId;
        let entry = self
            .authors
            .entry(doc.author.clone())
            .or_insert_with(|| Author {
                name: doc.author.clone(),
                ..Author::default()
            });
        entry.doc_ids.push(id);
        self.docs.push(doc);
        self.generation += 1;
        id
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn get(&self, id: DocId) -> Option<&Document> {
        self.docs.get(id as usize)
    }

    pub fn documents(&self) -> &[Document] {
        &self.docs
    }

    /// Documents with their ids, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (DocId, &Document)> {
        self.docs.iter().enumerate().map(|(i, d)| (i as DocId, d))
    }

    /// Documents with their ids, reordered by the given key. Ties keep
    /// insertion order.
    pub fn documents_sorted_by(&self, key: SortKey) -> Vec<(DocId, &Document)> {
        let mut listed: Vec<(DocId, &Document)> = self.iter().collect();
        match key {
            SortKey::Date => listed.sort_by(|a, b| a.1.date.cmp(&b.1.date)),
            SortKey::Title => listed.sort_by(|a, b| a.1.title.cmp(&b.1.title)),
        }
        listed
    }

    pub fn author(&self, name: &str) -> Option<&Author> {
        self.authors.get(name)
    }

    pub fn authors(&self) -> impl Iterator<Item = &Author> {
        self.authors.values()
    }

    pub fn author_count(&self) -> usize {
        self.authors.len()
    }

    /// Mean raw-text length (in chars) over the author's documents.
    pub fn author_mean_text_len(&self, name: &str) -> Option<f64> {
        let author = self.authors.get(name)?;
        if author.doc_ids.is_empty() {
            return Some(0.0);
        }
        let total: usize = author
            .doc_ids
            .iter()
            .filter_map(|&id| self.get(id))
            .map(|d| d.text.chars().count())
            .sum();
        Some(total as f64 / author.doc_ids.len() as f64)
    }

    pub fn normalizer(&self) -> NormalizerConfig {
        self.normalizer
    }

    /// Toggle stopword filtering. Counts as a normalization change, so all
    /// derived caches become stale.
    pub fn set_stopword_filtering(&mut self, enabled: bool) {
        if self.normalizer.remove_stopwords != enabled {
            self.normalizer.remove_stopwords = enabled;
            self.generation += 1;
        }
    }

    /// All document texts joined with single spaces, in insertion order.
    /// Rebuilt on first access after any mutation.
    pub fn full_text(&mut self) -> &str {
        let stale = !matches!(&self.full_text, Some((gen, _)) if *gen == self.generation);
        if stale {
            let joined = self
                .docs
                .iter()
                .map(|d| d.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            self.full_text = Some((self.generation, joined));
        }
        // invariant: rebuilt above when stale
        &self.full_text.as_ref().unwrap().1
    }

    /// Every occurrence of `keyword` in the corpus text, with up to 50 chars
    /// of context on each side, in occurrence order.
    pub fn find_passages(&mut self, keyword: &str) -> Vec<String> {
        let text = self.full_text();
        lexical::find_passages(text, keyword)
    }

    /// Keyword-in-context concordance over the corpus text.
    pub fn concordance(&mut self, expression: &str, context_width: usize) -> Vec<KwicEntry> {
        let text = self.full_text();
        lexical::concordance(text, expression, context_width)
    }

    /// The `top_n` most frequent tokens under the current normalization
    /// policy, with total occurrence counts and document frequencies.
    /// Descending by occurrence count, ties by ascending token string.
    pub fn frequency_stats(&mut self, top_n: usize) -> Vec<TokenStat> {
        let table = self.frequency_table();
        table.iter().take(top_n).cloned().collect()
    }

    /// Number of distinct tokens under the current normalization policy.
    pub fn distinct_token_count(&mut self) -> usize {
        self.frequency_table().len()
    }

    fn frequency_table(&mut self) -> &[TokenStat] {
        let stale = !matches!(&self.freq_table, Some((gen, _)) if *gen == self.generation);
        if stale {
            let table = self.build_frequency_table();
            self.freq_table = Some((self.generation, table));
        }
        &self.freq_table.as_ref().unwrap().1
    }

    fn build_frequency_table(&self) -> Vec<TokenStat> {
        let mut totals: HashMap<String, u64> = HashMap::new();
        let mut doc_freq: HashMap<String, u32> = HashMap::new();
        for doc in &self.docs {
            let mut seen: HashSet<String> = HashSet::new();
            for token in tokenize(&doc.text, self.normalizer) {
                *totals.entry(token.clone()).or_insert(0) += 1;
                seen.insert(token);
            }
            for token in seen {
                *doc_freq.entry(token).or_insert(0) += 1;
            }
        }
        let mut table: Vec<TokenStat> = totals
            .into_iter()
            .map(|(token, total_occurrences)| {
                let document_frequency = doc_freq.get(&token).copied().unwrap_or(0);
                TokenStat {
                    token,
                    total_occurrences,
                    document_frequency,
                }
            })
            .collect();
        table.sort_by(|a, b| {
            b.total_occurrences
                .cmp(&a.total_occurrences)
                .then_with(|| a.token.cmp(&b.token))
        });
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(author: &str, text: &str) -> Document {
        Document::new("t", author, "2024-01-01", "", text)
    }

    #[test]
    fn ids_are_dense_and_stable() {
        let mut corpus = Corpus::new("test");
        assert_eq!(corpus.add_document(doc("ada", "one")), 0);
        assert_eq!(corpus.add_document(doc("bob", "two")), 1);
        assert_eq!(corpus.get(0).unwrap().text, "one");
        assert!(corpus.get(2).is_none());
    }

    #[test]
    fn author_registry_tracks_productions() {
        let mut corpus = Corpus::new("test");
        corpus.add_document(doc("ada", "abcd"));
        corpus.add_document(doc("ada", "ab"));
        corpus.add_document(doc("bob", "x"));
        assert_eq!(corpus.author_count(), 2);
        assert_eq!(corpus.author("ada").unwrap().doc_count(), 2);
        assert_eq!(corpus.author_mean_text_len("ada"), Some(3.0));
        assert!(corpus.author("eve").is_none());
    }

    #[test]
    fn listing_sorts_by_date_or_title_with_stable_ties() {
        let mut corpus = Corpus::new("test");
        corpus.add_document(Document::new("banana", "a", "2024-03-01", "", "x"));
        corpus.add_document(Document::new("apple", "a", "2024-01-01", "", "y"));
        corpus.add_document(Document::new("cherry", "a", "2024-01-01", "", "z"));

        let by_date: Vec<DocId> = corpus
            .documents_sorted_by(SortKey::Date)
            .iter()
            .map(|(id, _)| *id)
            .collect();
        // equal dates keep insertion order
        assert_eq!(by_date, vec![1, 2, 0]);

        let by_title: Vec<&str> = corpus
            .documents_sorted_by(SortKey::Title)
            .iter()
            .map(|(_, d)| d.title.as_str())
            .collect();
        assert_eq!(by_title, vec!["apple", "banana", "cherry"]);

        // the listing never reorders the collection itself
        let ids: Vec<DocId> = corpus.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn full_text_cache_tracks_appends() {
        let mut corpus = Corpus::new("test");
        corpus.add_document(doc("ada", "hello"));
        assert_eq!(corpus.full_text(), "hello");
        corpus.add_document(doc("bob", "world"));
        assert_eq!(corpus.full_text(), "hello world");
    }

    #[test]
    fn frequency_table_orders_by_count_then_token() {
        let mut corpus = Corpus::new("test");
        corpus.add_document(doc("ada", "b b a c"));
        let stats = corpus.frequency_stats(10);
        let tokens: Vec<&str> = stats.iter().map(|s| s.token.as_str()).collect();
        assert_eq!(tokens, vec!["b", "a", "c"]);
        assert_eq!(stats[0].total_occurrences, 2);
        assert_eq!(stats[0].document_frequency, 1);
    }

    #[test]
    fn stopword_toggle_invalidates_stats() {
        let mut corpus = Corpus::new("test");
        corpus.add_document(doc("ada", "the cat and the dog"));
        let before = corpus.distinct_token_count();
        corpus.set_stopword_filtering(true);
        let after = corpus.distinct_token_count();
        assert!(after < before);
        assert_eq!(after, 2);
    }
}
