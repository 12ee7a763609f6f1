use anyhow::{Context, Result};
use clap::Parser;
use engine::persist::save_corpus;
use engine::{Corpus, Document};
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

/// Shortest text worth keeping, in chars.
const MIN_TEXT_LEN: usize = 20;

#[derive(Parser, Debug)]
#[command(name = "harvester")]
#[command(about = "Fetch themed documents from Reddit and arXiv into a TSV corpus snapshot")]
struct Cli {
    /// Free-text theme to search for
    #[arg(long, default_value = "machine learning")]
    theme: String,
    /// Maximum Reddit posts to fetch
    #[arg(long, default_value_t = 5)]
    reddit_limit: usize,
    /// Maximum arXiv abstracts to fetch
    #[arg(long, default_value_t = 5)]
    arxiv_limit: usize,
    /// Output TSV snapshot path
    #[arg(long, default_value = "./corpus.tsv")]
    output: String,
    /// Request timeout seconds
    #[arg(long, default_value_t = 12)]
    timeout_secs: u64,
    /// User-Agent string sent with every request
    #[arg(long, default_value = "corpus-harvester/0.1 (+https://example.com)")]
    user_agent: String,
}

#[derive(Deserialize)]
struct RedditListing {
    data: RedditListingData,
}

#[derive(Deserialize)]
struct RedditListingData {
    children: Vec<RedditChild>,
}

#[derive(Deserialize)]
struct RedditChild {
    data: RedditPost,
}

#[derive(Deserialize)]
struct RedditPost {
    title: String,
    #[serde(default)]
    author: String,
    created_utc: f64,
    permalink: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    num_comments: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();

    let client = Client::builder()
        .user_agent(args.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()?;

    let mut corpus = Corpus::new(format!("corpus '{}'", args.theme));

    match fetch_reddit(&client, &args.theme, args.reddit_limit).await {
        Ok(docs) => {
            let fetched = docs.len();
            for doc in docs {
                corpus.add_document(doc);
            }
            tracing::info!(fetched, "reddit documents added");
        }
        Err(err) => tracing::warn!(error = %err, "reddit fetch failed, continuing"),
    }

    match fetch_arxiv(&client, &args.theme, args.arxiv_limit).await {
        Ok(docs) => {
            let fetched = docs.len();
            for doc in docs {
                corpus.add_document(doc);
            }
            tracing::info!(fetched, "arxiv documents added");
        }
        Err(err) => tracing::warn!(error = %err, "arxiv fetch failed, continuing"),
    }

    save_corpus(&corpus, &args.output)?;
    tracing::info!(
        docs = corpus.len(),
        authors = corpus.author_count(),
        output = %args.output,
        "corpus snapshot written"
    );
    Ok(())
}

async fn fetch_reddit(client: &Client, theme: &str, limit: usize) -> Result<Vec<Document>> {
    let limit_param = limit.to_string();
    let url = Url::parse_with_params(
        "https://www.reddit.com/search.json",
        &[("q", theme), ("limit", limit_param.as_str())],
    )?;
    let listing: RedditListing = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .context("decoding reddit listing")?;

    Ok(listing
        .data
        .children
        .into_iter()
        .take(limit)
        .filter_map(|child| reddit_doc(child.data))
        .collect())
}

/// Turn one Reddit post into a document: title and selftext become the
/// flattened text, the Unix timestamp becomes RFC3339, the permalink gets
/// its host prefix. Posts below the minimum text length are dropped.
fn reddit_doc(post: RedditPost) -> Option<Document> {
    let text = flatten_ws(&format!("{} {}", post.title, post.selftext));
    if text.chars().count() < MIN_TEXT_LEN {
        return None;
    }
    let date = OffsetDateTime::from_unix_timestamp(post.created_utc as i64)
        .ok()
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_default();
    let url = format!("https://reddit.com{}", post.permalink);
    let author = if post.author.is_empty() { "unknown".to_string() } else { post.author };
    Some(Document::reddit(post.title, author, date, url, text, post.num_comments))
}

async fn fetch_arxiv(client: &Client, theme: &str, limit: usize) -> Result<Vec<Document>> {
    let url = Url::parse_with_params(
        "http://export.arxiv.org/api/query",
        &[
            ("search_query", format!("all:{theme}")),
            ("start", "0".to_string()),
            ("max_results", limit.to_string()),
        ],
    )?;
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
        .context("reading arxiv feed")?;
    Ok(parse_arxiv_feed(&body, limit))
}

/// Pull documents out of an arXiv Atom feed. The feed is XML, but its
/// element names survive an HTML parse, which is all the extraction needs.
fn parse_arxiv_feed(body: &str, limit: usize) -> Vec<Document> {
    let feed = Html::parse_document(body);
    let sel_entry = Selector::parse("entry").expect("valid selector");
    let sel_title = Selector::parse("title").expect("valid selector");
    let sel_summary = Selector::parse("summary").expect("valid selector");
    let sel_author = Selector::parse("author > name").expect("valid selector");
    let sel_published = Selector::parse("published").expect("valid selector");
    let sel_id = Selector::parse("id").expect("valid selector");

    let mut docs = Vec::new();
    for entry in feed.select(&sel_entry).take(limit) {
        let text_of = |sel: &Selector| {
            entry
                .select(sel)
                .next()
                .map(|el| flatten_ws(&el.text().collect::<String>()))
                .unwrap_or_default()
        };
        let title = text_of(&sel_title);
        let summary = text_of(&sel_summary);
        if summary.chars().count() < MIN_TEXT_LEN {
            continue;
        }
        let mut authors: Vec<String> = entry
            .select(&sel_author)
            .map(|el| flatten_ws(&el.text().collect::<String>()))
            .filter(|name| !name.is_empty())
            .collect();
        let author = if authors.is_empty() {
            "unknown".to_string()
        } else {
            authors.remove(0)
        };
        let published = text_of(&sel_published);
        let url = text_of(&sel_id);
        docs.push(Document::arxiv(title, author, published, url, summary, authors));
    }
    docs
}

fn flatten_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::Source;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query: search_query=all:machine learning</title>
  <entry>
    <id>http://arxiv.org/abs/1234.5678v1</id>
    <published>2024-05-01T00:00:00Z</published>
    <title>A Survey of
      Machine Learning</title>
    <summary>We survey the field of machine learning in considerable depth.</summary>
    <author><name>Ada Lovelace</name></author>
    <author><name>Charles Babbage</name></author>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/9999.0001v1</id>
    <published>2024-06-01T00:00:00Z</published>
    <title>Too short</title>
    <summary>tiny</summary>
    <author><name>Nobody</name></author>
  </entry>
</feed>"#;

    #[test]
    fn parses_entries_with_author_split() {
        let docs = parse_arxiv_feed(FEED, 10);
        assert_eq!(docs.len(), 1, "short summary must be filtered out");
        let doc = &docs[0];
        assert_eq!(doc.title, "A Survey of Machine Learning");
        assert_eq!(doc.author, "Ada Lovelace");
        assert_eq!(doc.date, "2024-05-01T00:00:00Z");
        assert_eq!(doc.url, "http://arxiv.org/abs/1234.5678v1");
        assert_eq!(
            doc.source,
            Source::Arxiv { co_authors: vec!["Charles Babbage".to_string()] }
        );
    }

    #[test]
    fn entry_limit_is_honored() {
        let docs = parse_arxiv_feed(FEED, 0);
        assert!(docs.is_empty());
    }

    #[test]
    fn flatten_ws_collapses_runs() {
        assert_eq!(flatten_ws("  a\n b\t\tc "), "a b c");
    }

    fn post(title: &str, selftext: &str) -> RedditPost {
        RedditPost {
            title: title.to_string(),
            author: "ada".to_string(),
            created_utc: 1_714_521_600.0,
            permalink: "/r/ml/comments/abc/post/".to_string(),
            selftext: selftext.to_string(),
            num_comments: 7,
        }
    }

    #[test]
    fn reddit_posts_map_to_documents() {
        let doc = reddit_doc(post("A title", "body\nwith lines")).unwrap();
        assert_eq!(doc.text, "A title body with lines");
        assert_eq!(doc.author, "ada");
        assert_eq!(doc.date, "2024-05-01T00:00:00Z");
        assert_eq!(doc.url, "https://reddit.com/r/ml/comments/abc/post/");
        assert_eq!(doc.source, Source::Reddit { num_comments: 7 });
    }

    #[test]
    fn short_reddit_posts_are_dropped() {
        assert!(reddit_doc(post("tiny", "")).is_none());
    }

    #[test]
    fn deleted_reddit_author_falls_back_to_unknown() {
        let mut p = post("A sufficiently long title here", "and some body text");
        p.author = String::new();
        let doc = reddit_doc(p).unwrap();
        assert_eq!(doc.author, "unknown");
    }
}
