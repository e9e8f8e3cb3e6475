//! Atom feed parser for arXiv query pages
//!
//! This module handles parsing a raw query response to extract:
//! - The declared result total (`opensearch:totalResults`)
//! - One entry per result: canonical id, author names, title, publication date

use crate::url::canonical_id;
use crate::HarvestError;
use quick_xml::de::from_str;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AtomFeed {
    // Namespace prefixes are dropped by the deserializer, so
    // `opensearch:totalResults` arrives as `totalResults`.
    #[serde(rename = "totalResults", default)]
    total_results: Option<String>,

    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    id: Option<String>,

    #[serde(default)]
    title: Option<String>,

    #[serde(default)]
    published: Option<String>,

    #[serde(rename = "author", default)]
    authors: Vec<AtomAuthor>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    #[serde(default)]
    name: Option<String>,
}

/// One result row of a query page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Canonical id (version suffix stripped)
    pub external_id: String,

    /// Author names in listed order
    pub author_names: Vec<String>,

    pub title: Option<String>,

    /// Raw `published` timestamp, e.g. `2017-12-05T18:59:59Z`
    pub published: Option<String>,
}

/// Result of parsing one query page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFeed {
    /// Total reported by the service; 0 when absent or unparseable
    pub declared_total: u64,

    pub entries: Vec<FeedEntry>,
}

/// One paginated response for an author
///
/// Persisted once under its page index and reused verbatim on resume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPage {
    pub author_key: String,
    pub page_index: u32,
    pub raw_content: String,
    pub declared_total: u64,
    pub entries: Vec<FeedEntry>,
}

impl FeedPage {
    /// Parses raw content into a page
    pub fn parse(
        author_key: &str,
        page_index: u32,
        raw_content: String,
    ) -> Result<Self, HarvestError> {
        let parsed = parse_feed(&raw_content)?;
        Ok(Self {
            author_key: author_key.to_string(),
            page_index,
            raw_content,
            declared_total: parsed.declared_total,
            entries: parsed.entries,
        })
    }
}

/// Parses an arXiv Atom response
///
/// Entries without an id are skipped. A missing or unparseable total is
/// reported as 0 rather than as an error.
///
/// # Errors
///
/// Returns `HarvestError::FeedParse` if the content is not well-formed XML.
///
/// # Example
///
/// ```
/// use arxiv_ripple::crawler::parse_feed;
///
/// let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"
///                    xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">
///   <opensearch:totalResults>1</opensearch:totalResults>
///   <entry>
///     <id>http://arxiv.org/abs/1712.01815v1</id>
///     <author><name>David Silver</name></author>
///   </entry>
/// </feed>"#;
/// let parsed = parse_feed(xml).unwrap();
/// assert_eq!(parsed.declared_total, 1);
/// assert_eq!(parsed.entries[0].external_id, "1712.01815");
/// ```
pub fn parse_feed(raw: &str) -> Result<ParsedFeed, HarvestError> {
    let feed: AtomFeed = from_str(raw).map_err(|e| HarvestError::FeedParse(e.to_string()))?;

    let declared_total = feed
        .total_results
        .as_deref()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(0);

    let entries = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let external_id = canonical_id(entry.id.as_deref()?)?;
            let author_names = entry
                .authors
                .into_iter()
                .filter_map(|author| author.name)
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect();

            Some(FeedEntry {
                external_id,
                author_names,
                title: non_blank(entry.title),
                published: non_blank(entry.published),
            })
        })
        .collect();

    Ok(ParsedFeed {
        declared_total,
        entries,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
