use serde::{Deserialize, Serialize};

/// Source-specific payload carried alongside the common document fields.
/// The core never dispatches on it; it only matters to ingestion and display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    Plain,
    Reddit { num_comments: u32 },
    Arxiv { co_authors: Vec<String> },
}

impl Source {
    /// Stable kind tag used by the flat persistence format.
    pub fn kind(&self) -> &'static str {
        match self {
            Source::Plain => "document",
            Source::Reddit { .. } => "reddit",
            Source::Arxiv { .. } => "arxiv",
        }
    }
}

/// Immutable document record. Never mutated after ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub author: String,
    pub date: String,
    pub url: String,
    pub text: String,
    pub source: Source,
}

impl Document {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        date: impl Into<String>,
        url: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            date: date.into(),
            url: url.into(),
            text: text.into(),
            source: Source::Plain,
        }
    }

    pub fn reddit(
        title: impl Into<String>,
        author: impl Into<String>,
        date: impl Into<String>,
        url: impl Into<String>,
        text: impl Into<String>,
        num_comments: u32,
    ) -> Self {
        Self {
            source: Source::Reddit { num_comments },
            ..Self::new(title, author, date, url, text)
        }
    }

    pub fn arxiv(
        title: impl Into<String>,
        author: impl Into<String>,
        date: impl Into<String>,
        url: impl Into<String>,
        text: impl Into<String>,
        co_authors: Vec<String>,
    ) -> Self {
        Self {
            source: Source::Arxiv { co_authors },
            ..Self::new(title, author, date, url, text)
        }
    }

    /// Factory for rows read back from the flat format: rebuilds the variant
    /// from its kind tag. Per-source extras are not stored in that format and
    /// come back as defaults; unknown tags fall back to a plain document.
    pub fn from_kind(
        kind: &str,
        title: impl Into<String>,
        author: impl Into<String>,
        date: impl Into<String>,
        url: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let doc = Self::new(title, author, date, url, text);
        match kind.to_ascii_lowercase().as_str() {
            "reddit" => Self {
                source: Source::Reddit { num_comments: 0 },
                ..doc
            },
            "arxiv" => Self {
                source: Source::Arxiv { co_authors: Vec::new() },
                ..doc
            },
            _ => doc,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.source.kind()
    }
}
