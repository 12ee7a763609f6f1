pub mod corpus;
pub mod document;
pub mod index;
pub mod lexical;
pub mod persist;
pub mod sparse;
pub mod tokenizer;

/// Dense document id, assigned at insertion starting from 0, never reused.
pub type DocId = u32;
/// Dense vocabulary column id, assigned in sorted lexical order of the tokens.
pub type TermId = u32;

pub use corpus::{Author, Corpus, SortKey, TokenStat};
pub use document::{Document, Source};
pub use index::{EngineConfig, IdfScheme, SearchEngine, SearchHit, Vocabulary};
pub use lexical::KwicEntry;
pub use tokenizer::NormalizerConfig;
