use crate::authors::TrackedAuthor;
use serde::Deserialize;

/// Which author names of an entry are tested against the tracked author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicy {
    /// The entry is kept if any listed author matches
    #[default]
    AnyAuthor,

    /// The entry is kept only if its first listed author matches
    FirstAuthor,
}

impl MatchPolicy {
    /// Applies the policy to an entry's author list
    pub fn selects<S: AsRef<str>>(&self, author: &TrackedAuthor, names: &[S]) -> bool {
        match self {
            Self::AnyAuthor => names.iter().any(|name| author.matches_name(name.as_ref())),
            Self::FirstAuthor => names
                .first()
                .is_some_and(|name| author.matches_name(name.as_ref())),
        }
    }
}

/// Splits a name into lowercase alphabetic tokens
///
/// Every run of non-alphabetic characters (spaces, dots, commas, hyphens,
/// digits, accented letters) acts as a separator.
pub fn normalize_tokens(value: &str) -> Vec<String> {
    value
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_ascii_lowercase())
        .collect()
}

/// Checks whether a candidate author string names the target author
///
/// The last name must appear as whole tokens, either at the end of the
/// candidate ("David Silver") or at its start ("Silver, David"). The given
/// name next to it may be spelled out, abbreviated to an initial or prefix,
/// or extended ("Dave" does not match "David", "D." does).
///
/// # Examples
///
/// ```
/// use arxiv_ripple::authors::name_matches;
///
/// assert!(name_matches("David", "Silver", "David Silver"));
/// assert!(name_matches("David", "Silver", "D. Silver"));
/// assert!(name_matches("David", "Silver", "Silver, David"));
/// assert!(!name_matches("David", "Silver", "Dan Silverman"));
/// ```
pub fn name_matches(target_first: &str, target_last: &str, candidate: &str) -> bool {
    let first_tokens = normalize_tokens(target_first);
    let last_tokens = normalize_tokens(target_last);
    let tokens = normalize_tokens(candidate);

    let Some(first) = first_tokens.first() else {
        return false;
    };
    if last_tokens.is_empty() || tokens.len() < last_tokens.len() + 1 {
        return false;
    }

    let n = last_tokens.len();

    // "First [Middle] Last"
    let split = tokens.len() - n;
    if tokens[split..] == last_tokens[..]
        && (given_matches(&tokens[split - 1], first) || given_matches(&tokens[0], first))
    {
        return true;
    }

    // "Last, First"
    tokens[..n] == last_tokens[..] && given_matches(&tokens[n], first)
}

fn given_matches(token: &str, first: &str) -> bool {
    token == first || token.starts_with(first) || first.starts_with(token)
}
