//! Tracked authors
//!
//! This module provides:
//! - `TrackedAuthor`: the identity key of one crawl
//! - Fuzzy author-name matching and the entry selection policies
//! - The flat CSV registry listing authors for batch mode

mod matcher;
pub mod registry;

pub use matcher::{name_matches, normalize_tokens, MatchPolicy};
pub use registry::{append_author, load_authors};

use std::fmt;

/// An author whose papers are harvested
///
/// Names are stored as given by the user, minus surrounding whitespace and
/// stray commas (so `"Silver,"` and `"Silver"` are the same author).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackedAuthor {
    last_name: String,
    first_name: String,
}

impl TrackedAuthor {
    /// Creates a tracked author, or `None` if either name is blank
    pub fn new(last_name: &str, first_name: &str) -> Option<Self> {
        let last_name = clean_name(last_name);
        let first_name = clean_name(first_name);
        if last_name.is_empty() || first_name.is_empty() {
            return None;
        }

        Some(Self {
            last_name: last_name.to_string(),
            first_name: first_name.to_string(),
        })
    }

    /// Recovers an author from a cache directory name (`"<last>-<first>"`)
    ///
    /// The split happens at the first hyphen.
    pub fn from_key(key: &str) -> Option<Self> {
        let (last, first) = key.split_once('-')?;
        Self::new(last, first)
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Directory key of this author: `"<last>-<first>"`
    pub fn key(&self) -> String {
        format!("{}-{}", self.last_name, self.first_name)
    }

    /// arXiv author query expression, e.g. `au:"David Silver"`
    pub fn query_expression(&self) -> String {
        format!("au:\"{} {}\"", self.first_name, self.last_name)
    }

    /// Case-insensitive identity used for registry dedup
    pub fn same_identity(&self, other: &TrackedAuthor) -> bool {
        self.last_name.to_lowercase() == other.last_name.to_lowercase()
            && self.first_name.to_lowercase() == other.first_name.to_lowercase()
    }

    /// Tests one author name string against this author
    pub fn matches_name(&self, candidate: &str) -> bool {
        name_matches(&self.first_name, &self.last_name, candidate)
    }
}

impl fmt::Display for TrackedAuthor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.last_name, self.first_name)
    }
}

fn clean_name(value: &str) -> &str {
    value.trim().trim_matches(',').trim()
}
