use crate::authors::TrackedAuthor;
use url::Url;

/// Builds the query URL for one page of an author's results
///
/// Results are requested newest first (`sortBy=submittedDate`,
/// `sortOrder=descending`) so that pagination windows stay stable for
/// older entries while new submissions arrive.
///
/// # Arguments
///
/// * `base` - The query endpoint, e.g. `https://export.arxiv.org/api/query`
/// * `author` - The tracked author
/// * `start` - Zero-based result offset
/// * `page_size` - Maximum results in the page
///
/// # Examples
///
/// ```
/// use arxiv_ripple::authors::TrackedAuthor;
/// use arxiv_ripple::url::build_query_url;
///
/// let author = TrackedAuthor::new("Silver", "David").unwrap();
/// let url = build_query_url("https://export.arxiv.org/api/query", &author, 50, 50).unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://export.arxiv.org/api/query?search_query=au%3A%22David+Silver%22\
///      &start=50&max_results=50&sortBy=submittedDate&sortOrder=descending"
/// );
/// ```
pub fn build_query_url(
    base: &str,
    author: &TrackedAuthor,
    start: u64,
    page_size: u32,
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("search_query", &author.query_expression())
        .append_pair("start", &start.to_string())
        .append_pair("max_results", &page_size.to_string())
        .append_pair("sortBy", "submittedDate")
        .append_pair("sortOrder", "descending");
    Ok(url)
}

/// Builds the abstract page URL for a canonical id
///
/// Old-style ids keep their archive prefix as a path segment
/// (`cs/0112017` -> `https://arxiv.org/abs/cs/0112017`).
pub fn build_document_url(base: &str, canonical_id: &str) -> Result<Url, url::ParseError> {
    let base = base.trim_end_matches('/');
    Url::parse(&format!("{}/{}", base, canonical_id))
}
