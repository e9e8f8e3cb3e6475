//! Paper index built from cached query pages
//!
//! Walks `AUTHORS/*/API/page-*.xml`, turns every usable entry into a
//! `(year, title, pdf url)` row, deduplicates by URL keeping the earliest
//! year and writes the rows sorted newest first.

use crate::authors::TrackedAuthor;
use crate::crawler::parse_feed;
use crate::output::csv::format_record;
use crate::storage::{write_atomic, PAGES_DIR};
use crate::url::pdf_url;
use crate::HarvestError;
use chrono::{DateTime, Datelike};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Which cached entries make it into the index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexSelection {
    /// Every entry of every cached page
    #[default]
    AllEntries,

    /// Only entries whose first listed author is the directory's author
    FirstAuthor,
}

/// One row of the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paper {
    pub year: i32,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Default)]
pub struct IndexReport {
    /// Sorted, deduplicated rows
    pub papers: Vec<Paper>,

    /// Pages that could not be read or parsed
    pub unreadable: usize,
}

/// Collects papers from every author directory under `authors_dir`
///
/// # Errors
///
/// Fails only if `authors_dir` itself cannot be listed; unreadable pages
/// are counted in the report and skipped.
pub fn collect_papers(
    authors_dir: &Path,
    selection: IndexSelection,
) -> Result<IndexReport, HarvestError> {
    let mut by_url: HashMap<String, Paper> = HashMap::new();
    let mut unreadable = 0;

    for author_dir in sorted_entries(authors_dir, |path: &Path| path.is_dir())? {
        let tracked = match selection {
            IndexSelection::AllEntries => None,
            IndexSelection::FirstAuthor => {
                let key = author_dir
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or_default();
                match TrackedAuthor::from_key(key) {
                    Some(author) => Some(author),
                    None => {
                        tracing::debug!("Skipping directory {}", author_dir.display());
                        continue;
                    }
                }
            }
        };

        let pages_dir = author_dir.join(PAGES_DIR);
        if !pages_dir.is_dir() {
            continue;
        }

        for page_path in sorted_entries(&pages_dir, is_page_file)? {
            let parsed = std::fs::read_to_string(&page_path)
                .map_err(HarvestError::from)
                .and_then(|raw| parse_feed(&raw));
            let feed = match parsed {
                Ok(feed) => feed,
                Err(e) => {
                    tracing::warn!("Skipping unreadable page {}: {}", page_path.display(), e);
                    unreadable += 1;
                    continue;
                }
            };

            for entry in feed.entries {
                if let Some(author) = &tracked {
                    let first_listed = entry.author_names.first();
                    if !first_listed.is_some_and(|name| author.matches_name(name)) {
                        continue;
                    }
                }

                let title = entry.title.as_deref().map(normalize_space).unwrap_or_default();
                let Some(year) = entry.published.as_deref().and_then(parse_year) else {
                    continue;
                };
                if title.is_empty() {
                    continue;
                }

                let paper = Paper {
                    year,
                    title,
                    url: pdf_url(&entry.external_id),
                };
                match by_url.get(&paper.url) {
                    Some(existing) if existing.year <= paper.year => {}
                    _ => {
                        by_url.insert(paper.url.clone(), paper);
                    }
                }
            }
        }
    }

    let mut papers: Vec<Paper> = by_url.into_values().collect();
    papers.sort_by(|a, b| {
        b.year
            .cmp(&a.year)
            .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
            .then_with(|| a.url.cmp(&b.url))
    });

    Ok(IndexReport { papers, unreadable })
}

/// Writes the index as `year,title,url` CSV, atomically
pub fn write_index_csv(path: &Path, papers: &[Paper]) -> Result<(), HarvestError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut content = format_record(&["year", "title", "url"]);
    for paper in papers {
        let year = paper.year.to_string();
        content.push_str(&format_record(&[
            year.as_str(),
            paper.title.as_str(),
            paper.url.as_str(),
        ]));
    }

    write_atomic(path, content.as_bytes())?;
    tracing::info!("Wrote {} rows to {}", papers.len(), path.display());
    Ok(())
}

/// Collects papers and writes them to `output`
pub fn build_index(
    authors_dir: &Path,
    output: &Path,
    selection: IndexSelection,
) -> Result<IndexReport, HarvestError> {
    let report = collect_papers(authors_dir, selection)?;
    write_index_csv(output, &report.papers)?;
    if report.unreadable > 0 {
        tracing::warn!("Skipped {} unreadable page(s)", report.unreadable);
    }
    Ok(report)
}

/// Year of a `published` timestamp
///
/// Falls back to a leading four-digit year when the value is not RFC 3339.
fn parse_year(published: &str) -> Option<i32> {
    let published = published.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(published) {
        return Some(timestamp.year());
    }
    let prefix = published.get(..4)?;
    if prefix.chars().all(|c| c.is_ascii_digit()) {
        prefix.parse().ok()
    } else {
        None
    }
}

fn normalize_space(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_page_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("page-") && name.ends_with(".xml"))
}

fn sorted_entries(dir: &Path, keep: fn(&Path) -> bool) -> Result<Vec<PathBuf>, HarvestError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if keep(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
