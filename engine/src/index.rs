//! Vocabulary construction, sparse TF / TF-IDF weighting and cosine-ranked
//! query evaluation over a corpus snapshot.

use std::collections::{BTreeMap, HashMap};

use crate::corpus::Corpus;
use crate::sparse::CsrMatrix;
use crate::tokenizer::{tokenize, NormalizerConfig};
use crate::{DocId, TermId};

/// Per-token aggregates kept alongside the id assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermEntry {
    pub token: String,
    pub total_occurrences: u64,
    pub document_frequency: u32,
}

/// Bijection between normalized tokens and dense column ids. Ids are
/// assigned in sorted lexical order of the distinct token set, so a given
/// document set always produces the same columns regardless of insertion
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    terms: Vec<TermEntry>,
    lookup: HashMap<String, TermId>,
}

impl Vocabulary {
    /// Build from per-document token lists. An empty collection yields an
    /// empty vocabulary, which every downstream stage accepts.
    pub fn build(token_lists: &[Vec<String>]) -> Self {
        // BTreeMap gives the sorted id assignment for free
        let mut stats: BTreeMap<&str, (u64, u32)> = BTreeMap::new();
        for tokens in token_lists {
            for token in tokens {
                stats.entry(token.as_str()).or_insert((0, 0)).0 += 1;
            }
        }
        // second sweep for document frequency over distinct tokens per doc
        for tokens in token_lists {
            let mut distinct: Vec<&str> = tokens.iter().map(String::as_str).collect();
            distinct.sort_unstable();
            distinct.dedup();
            for token in distinct {
                if let Some(entry) = stats.get_mut(token) {
                    entry.1 += 1;
                }
            }
        }

        let mut terms = Vec::with_capacity(stats.len());
        let mut lookup = HashMap::with_capacity(stats.len());
        for (id, (token, (total_occurrences, document_frequency))) in
            stats.into_iter().enumerate()
        {
            lookup.insert(token.to_string(), id as TermId);
            terms.push(TermEntry {
                token: token.to_string(),
                total_occurrences,
                document_frequency,
            });
        }
        Self { terms, lookup }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term_id(&self, token: &str) -> Option<TermId> {
        self.lookup.get(token).copied()
    }

    pub fn token(&self, id: TermId) -> Option<&str> {
        self.terms.get(id as usize).map(|t| t.token.as_str())
    }

    pub fn entry(&self, id: TermId) -> Option<&TermEntry> {
        self.terms.get(id as usize)
    }

    /// Entries in id order (sorted lexical order of the tokens).
    pub fn iter(&self) -> impl Iterator<Item = (TermId, &TermEntry)> {
        self.terms.iter().enumerate().map(|(i, t)| (i as TermId, t))
    }
}

/// IDF weighting scheme. Standard is `ln(N / df)`; Smoothed is
/// `ln(1 + N / df)`, which keeps a single-document corpus searchable
/// (standard IDF is zero for any token present in every document).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdfScheme {
    #[default]
    Standard,
    Smoothed,
}

impl IdfScheme {
    /// Weight for a token with document frequency `df` in a corpus of `n`
    /// documents. Zero document frequency is a safe no-op weight of 0.
    pub fn weight(self, n: usize, df: u32) -> f64 {
        if df == 0 {
            return 0.0;
        }
        let ratio = n as f64 / df as f64;
        match self {
            IdfScheme::Standard => ratio.ln(),
            IdfScheme::Smoothed => (1.0 + ratio).ln(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub normalizer: NormalizerConfig,
    pub idf: IdfScheme,
}

/// One ranked result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
}

/// One-shot index snapshot: vocabulary, sparse TF and TF-IDF matrices and
/// per-document norms, built from a corpus under a fixed normalization
/// policy. Rebuild in full after any corpus mutation; there is no
/// incremental update path.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    config: EngineConfig,
    vocab: Vocabulary,
    tf: CsrMatrix<u32>,
    tfidf: CsrMatrix<f64>,
    doc_norms: Vec<f64>,
    num_docs: usize,
}

impl SearchEngine {
    /// Build with the corpus's own normalization policy and standard IDF.
    pub fn build(corpus: &Corpus) -> Self {
        Self::build_with(
            corpus,
            EngineConfig {
                normalizer: corpus.normalizer(),
                idf: IdfScheme::default(),
            },
        )
    }

    pub fn build_with(corpus: &Corpus, config: EngineConfig) -> Self {
        // tokenize each document exactly once
        let token_lists: Vec<Vec<String>> = corpus
            .documents()
            .iter()
            .map(|doc| tokenize(&doc.text, config.normalizer))
            .collect();
        let vocab = Vocabulary::build(&token_lists);
        let num_docs = token_lists.len();

        // raw term counts, one pass over the tokens of each document
        let mut tf = CsrMatrix::new(vocab.len());
        let mut row: Vec<(TermId, u32)> = Vec::new();
        for tokens in &token_lists {
            let mut counts: HashMap<TermId, u32> = HashMap::new();
            for token in tokens {
                if let Some(id) = vocab.term_id(token) {
                    *counts.entry(id).or_insert(0) += 1;
                }
            }
            row.clear();
            row.extend(counts);
            tf.push_row(&mut row);
        }

        let idf: Vec<f64> = vocab
            .iter()
            .map(|(_, term)| config.idf.weight(num_docs, term.document_frequency))
            .collect();
        let tfidf = tf.map(|_, col, count| count as f64 * idf[col as usize]);

        let mut doc_norms = vec![0.0f64; num_docs];
        for (d, norm) in doc_norms.iter_mut().enumerate() {
            let (_, weights) = tfidf.row(d);
            *norm = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
        }

        tracing::debug!(
            num_docs,
            vocab_size = vocab.len(),
            nnz = tf.nnz(),
            "index snapshot built"
        );

        Self {
            config,
            vocab,
            tf,
            tfidf,
            doc_norms,
            num_docs,
        }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    /// Raw term count for (document, token), if the document exists and the
    /// token occurs in it.
    pub fn term_count(&self, doc_id: DocId, token: &str) -> Option<u32> {
        if doc_id as usize >= self.num_docs {
            return None;
        }
        let col = self.vocab.term_id(token)?;
        self.tf.get(doc_id as usize, col)
    }

    /// Query term counts projected onto vocabulary ids, column-sorted.
    /// Out-of-vocabulary tokens contribute nothing.
    fn vectorize_query(&self, query: &str) -> Vec<(TermId, f64)> {
        let mut counts: HashMap<TermId, f64> = HashMap::new();
        for token in tokenize(query, self.config.normalizer) {
            if let Some(id) = self.vocab.term_id(&token) {
                *counts.entry(id).or_insert(0.0) += 1.0;
            }
        }
        let mut vector: Vec<(TermId, f64)> = counts.into_iter().collect();
        vector.sort_unstable_by_key(|&(id, _)| id);
        vector
    }

    /// Cosine similarity between the query vector and one document row.
    /// Defined as 0 whenever either norm is 0.
    fn cosine(&self, query: &[(TermId, f64)], query_norm: f64, doc: usize) -> f64 {
        let doc_norm = self.doc_norms[doc];
        if query_norm == 0.0 || doc_norm == 0.0 {
            return 0.0;
        }
        let (cols, weights) = self.tfidf.row(doc);
        // both sides are column-sorted; merge walk
        let mut dot = 0.0;
        let mut i = 0;
        for &(col, q) in query {
            while i < cols.len() && cols[i] < col {
                i += 1;
            }
            if i < cols.len() && cols[i] == col {
                dot += q * weights[i];
            }
        }
        dot / (query_norm * doc_norm)
    }

    /// Rank documents against a free-text query. Results are sorted by
    /// descending score, ties broken by ascending document id; only strictly
    /// positive scores are returned, truncated to `top_k`. `top_k == 0`
    /// means no results; a `top_k` beyond the corpus size returns every
    /// qualifying document.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<SearchHit> {
        if top_k == 0 || self.num_docs == 0 {
            return Vec::new();
        }
        let q = self.vectorize_query(query);
        let query_norm = q.iter().map(|&(_, v)| v * v).sum::<f64>().sqrt();
        if query_norm == 0.0 {
            return Vec::new();
        }

        let mut hits: Vec<SearchHit> = (0..self.num_docs)
            .filter_map(|doc| {
                let score = self.cosine(&q, query_norm, doc);
                (score > 0.0).then_some(SearchHit {
                    doc_id: doc as DocId,
                    score,
                })
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        hits.truncate(top_k);
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_ids_follow_lexical_order() {
        let lists = vec![
            vec!["zebra".to_string(), "apple".to_string()],
            vec!["mango".to_string(), "apple".to_string()],
        ];
        let vocab = Vocabulary::build(&lists);
        assert_eq!(vocab.term_id("apple"), Some(0));
        assert_eq!(vocab.term_id("mango"), Some(1));
        assert_eq!(vocab.term_id("zebra"), Some(2));
        let apple = vocab.entry(0).unwrap();
        assert_eq!(apple.total_occurrences, 2);
        assert_eq!(apple.document_frequency, 2);
    }

    #[test]
    fn idf_weight_edge_cases() {
        assert_eq!(IdfScheme::Standard.weight(10, 0), 0.0);
        assert_eq!(IdfScheme::Standard.weight(4, 4), 0.0);
        assert!(IdfScheme::Smoothed.weight(4, 4) > 0.0);
        assert!((IdfScheme::Standard.weight(4, 2) - 2.0f64.ln()).abs() < 1e-12);
    }
}
