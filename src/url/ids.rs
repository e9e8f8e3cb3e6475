/// Marker preceding the id in an Atom entry's self URL
const ABS_MARKER: &str = "/abs/";

/// Extracts the canonical id from an Atom entry id
///
/// Takes the part after the last `/abs/` (or the whole value when the
/// marker is absent) and strips a trailing version suffix.
///
/// # Examples
///
/// ```
/// use arxiv_ripple::url::canonical_id;
///
/// assert_eq!(canonical_id("http://arxiv.org/abs/2101.00001v2"), Some("2101.00001".to_string()));
/// assert_eq!(canonical_id("http://arxiv.org/abs/cs/0112017v1"), Some("cs/0112017".to_string()));
/// assert_eq!(canonical_id("   "), None);
/// ```
pub fn canonical_id(entry_id: &str) -> Option<String> {
    let value = entry_id.trim();
    let value = match value.rfind(ABS_MARKER) {
        Some(pos) => &value[pos + ABS_MARKER.len()..],
        None => value,
    };

    let id = strip_version(value.trim());
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Strips a trailing `vN` version suffix
pub fn strip_version(id: &str) -> &str {
    let without_digits = id.trim_end_matches(|c: char| c.is_ascii_digit());
    if without_digits.len() == id.len() {
        return id;
    }

    without_digits.strip_suffix('v').unwrap_or(id)
}

/// Makes a canonical id safe to use as a file name
pub fn sanitize_id(id: &str) -> String {
    id.replace(['/', '\\'], "_")
}

/// PDF URL of a canonical id, used as the export's dedup key
pub fn pdf_url(canonical_id: &str) -> String {
    format!("https://arxiv.org/pdf/{}.pdf", canonical_id)
}
