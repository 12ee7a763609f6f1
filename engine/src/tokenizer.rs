use lazy_static::lazy_static;
use std::collections::HashSet;

lazy_static! {
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a", "an", "the", "and", "or", "but", "if", "then", "else",
            "to", "of", "in", "on", "for", "with", "as", "at", "by", "from",
            "is", "am", "are", "was", "were", "be", "been", "being",
            "it", "this", "that", "these", "those",
            "i", "you", "he", "she", "we", "they", "me", "him", "her", "us", "them",
            "my", "your", "his", "their", "our",
            "not", "no", "so", "too", "very",
            "can", "could", "should", "would", "will", "just",
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Normalization policy applied before any token-level statistic is computed.
/// Changing it invalidates every structure derived from the corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizerConfig {
    pub remove_stopwords: bool,
}

/// Clean raw text down to a single-spaced lowercase string of word characters.
///
/// Steps, in order: lowercase, punctuation and symbols become spaces
/// (alphanumerics, underscores and whitespace survive), digits are deleted
/// outright ("report2024final" becomes "reportfinal"), whitespace runs
/// collapse to single spaces, and stopwords are dropped when enabled.
pub fn clean_text(text: &str, config: NormalizerConfig) -> String {
    let mut chars = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_digit() {
            // decimal digits are deleted, not replaced by a space;
            // other numeric chars ('½', 'Ⅷ') count as word characters
            continue;
        }
        if c == '_' || c.is_alphanumeric() {
            chars.push(c);
        } else {
            chars.push(' ');
        }
    }

    let mut out = String::with_capacity(chars.len());
    for word in chars.split_whitespace() {
        if config.remove_stopwords && is_stopword(word) {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Tokenize raw text under the given normalization policy. Order and
/// duplicates are preserved; the empty string yields no tokens.
pub fn tokenize(text: &str, config: NormalizerConfig) -> Vec<String> {
    clean_text(text, config)
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}
