use anyhow::Result;
use clap::{Parser, Subcommand};
use engine::persist::load_corpus;
use engine::{Corpus, EngineConfig, IdfScheme, SearchEngine, SortKey};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Query a TSV corpus snapshot: search, passages, concordance, stats", long_about = None)]
struct Cli {
    /// Corpus snapshot (TSV) to load
    #[arg(long, default_value = "./corpus.tsv")]
    input: String,
    /// Strip stopwords before indexing and statistics
    #[arg(long, default_value_t = false)]
    stopwords: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank documents against a free-text query
    Search {
        query: String,
        /// Maximum number of results
        #[arg(long, default_value_t = 10)]
        top_k: usize,
        /// Use smoothed IDF = ln(1 + N/df) instead of ln(N/df)
        #[arg(long, default_value_t = false)]
        smoothed_idf: bool,
    },
    /// Show every passage containing a keyword
    Passages { keyword: String },
    /// Keyword-in-context concordance
    Concordance {
        expression: String,
        /// Context chars on each side
        #[arg(long, default_value_t = 30)]
        width: usize,
    },
    /// Corpus summary and most frequent tokens
    Stats {
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// List documents, optionally sorted by date or title
    Show {
        #[arg(long, value_parser = ["date", "title"])]
        sort: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let mut corpus = load_corpus(&cli.input, "corpus")?;
    corpus.set_stopword_filtering(cli.stopwords);
    tracing::info!(docs = corpus.len(), authors = corpus.author_count(), input = %cli.input, "corpus loaded");

    match cli.command {
        Commands::Search { query, top_k, smoothed_idf } => run_search(&corpus, &query, top_k, smoothed_idf),
        Commands::Passages { keyword } => run_passages(&mut corpus, &keyword),
        Commands::Concordance { expression, width } => run_concordance(&mut corpus, &expression, width),
        Commands::Stats { top } => run_stats(&mut corpus, top),
        Commands::Show { sort, limit } => run_show(&corpus, sort.as_deref(), limit),
    }
    Ok(())
}

fn run_search(corpus: &Corpus, query: &str, top_k: usize, smoothed_idf: bool) {
    let config = EngineConfig {
        normalizer: corpus.normalizer(),
        idf: if smoothed_idf { IdfScheme::Smoothed } else { IdfScheme::Standard },
    };
    let index = SearchEngine::build_with(corpus, config);
    let hits = index.search(query, top_k);
    if hits.is_empty() {
        println!("no results for {query:?}");
        return;
    }
    for (rank, hit) in hits.iter().enumerate() {
        // doc ids returned by search always exist in the snapshot
        let doc = corpus.get(hit.doc_id).expect("hit references a known document");
        println!(
            "{:>2}. [{}] {} - {} ({})  score={:.4}",
            rank + 1,
            doc.kind(),
            doc.title,
            doc.author,
            doc.date,
            hit.score
        );
        println!("    {}", highlight(&snippet(&doc.text, 160), query));
    }
}

fn run_passages(corpus: &mut Corpus, keyword: &str) {
    let passages = corpus.find_passages(keyword);
    println!("{} passage(s) for {keyword:?}", passages.len());
    for (i, passage) in passages.iter().enumerate() {
        println!("{:>3}. ...{passage}...", i + 1);
    }
}

fn run_concordance(corpus: &mut Corpus, expression: &str, width: usize) {
    let entries = corpus.concordance(expression, width);
    println!("{} occurrence(s) of {expression:?}", entries.len());
    for entry in entries {
        println!("{:>w$} | {} | {}", entry.left, entry.matched, entry.right, w = width);
    }
}

fn run_stats(corpus: &mut Corpus, top: usize) {
    let name = corpus.name().to_string();
    let len = corpus.len();
    let author_count = corpus.author_count();
    let distinct_token_count = corpus.distinct_token_count();
    println!(
        "corpus '{name}': {len} documents, {author_count} authors, {distinct_token_count} distinct tokens"
    );
    println!("\ntop {top} tokens:");
    for stat in corpus.frequency_stats(top) {
        println!(
            "  {:<20} {:>6} occurrence(s) in {:>4} document(s)",
            stat.token, stat.total_occurrences, stat.document_frequency
        );
    }
}

fn run_show(corpus: &Corpus, sort: Option<&str>, limit: usize) {
    let listed = match sort {
        Some("date") => corpus.documents_sorted_by(SortKey::Date),
        Some("title") => corpus.documents_sorted_by(SortKey::Title),
        _ => corpus.iter().collect(),
    };
    for (id, doc) in listed.into_iter().take(limit) {
        println!("{id:>4}. [{}] {} - {} ({})", doc.kind(), doc.title, doc.author, doc.date);
    }
}

/// First `max_chars` chars of a text, with a trailing ellipsis when cut.
fn snippet(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

/// Bracket every query term in the snippet, case-insensitively. Terms are
/// deduplicated first so a repeated term is bracketed only once.
fn highlight(snippet: &str, query: &str) -> String {
    let mut terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    terms.sort_unstable();
    terms.dedup();
    let mut out = snippet.to_string();
    for term in terms {
        let Ok(pattern) = regex::RegexBuilder::new(&regex::escape(&term))
            .case_insensitive(true)
            .build()
        else {
            continue;
        };
        out = pattern
            .replace_all(&out, |caps: &regex::Captures| format!("[{}]", &caps[0]))
            .to_string();
    }
    out
}
