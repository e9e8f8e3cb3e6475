//! Tracked-author registry
//!
//! A two-column CSV (`last-name,first-name`) listing the authors crawled in
//! batch mode. Appending is idempotent under case-insensitive comparison.

use crate::authors::TrackedAuthor;
use crate::output::csv::{format_record, parse_record};
use crate::HarvestError;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

const HEADER: [&str; 2] = ["last-name", "first-name"];

/// Loads every well-formed author row from the registry
///
/// A missing file yields an empty list. The header, blank rows, rows with
/// fewer than two columns and rows with a blank name are skipped.
pub fn load_authors(path: &Path) -> Result<Vec<TrackedAuthor>, HarvestError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)?;
    let mut authors = Vec::new();

    for (row_index, line) in content.lines().enumerate() {
        let row = parse_record(line);
        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        if row_index == 0 && row[0].to_lowercase().contains("last") {
            continue;
        }
        if row.len() < 2 {
            tracing::debug!("Skipping short registry row {}: {:?}", row_index + 1, line);
            continue;
        }

        if let Some(author) = TrackedAuthor::new(&row[0], &row[1]) {
            authors.push(author);
        }
    }

    Ok(authors)
}

/// Appends an author unless the registry already lists them
///
/// Creates the file (with its header) on first use.
///
/// # Returns
///
/// * `Ok(true)` - The author was appended
/// * `Ok(false)` - The author was already registered
pub fn append_author(path: &Path, author: &TrackedAuthor) -> Result<bool, HarvestError> {
    ensure_header(path)?;

    if load_authors(path)?
        .iter()
        .any(|existing| existing.same_identity(author))
    {
        tracing::debug!("{} already in registry {}", author, path.display());
        return Ok(false);
    }

    let existing = std::fs::read_to_string(path)?;
    let needs_newline = !existing.is_empty() && !existing.ends_with('\n');
    let mut file = OpenOptions::new().append(true).open(path)?;
    if needs_newline {
        file.write_all(b"\n")?;
    }
    file.write_all(format_record(&[author.last_name(), author.first_name()]).as_bytes())?;

    tracing::info!("Added {} to registry {}", author, path.display());
    Ok(true)
}

fn ensure_header(path: &Path) -> Result<(), HarvestError> {
    if path.exists() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, format_record(&HEADER))?;
    Ok(())
}
