//! Sequential crawl of every registered author
//!
//! Each author is probed for its declared total first. Authors with nothing
//! to fetch, or whose document store already holds at least as many
//! documents as declared, are skipped. A failure is recorded and the batch
//! moves on to the next author unless `stop-on-fail` is set.

use crate::authors::TrackedAuthor;
use crate::config::BatchConfig;
use crate::crawler::coordinator::{Coordinator, CrawlResult};
use crate::storage::AuthorLayout;
use std::path::Path;

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub completed: Vec<(TrackedAuthor, CrawlResult)>,
    pub skipped: Vec<TrackedAuthor>,
    pub failed: Vec<(TrackedAuthor, String)>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.completed.len() + self.skipped.len() + self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Returns true if an author needs no crawl
///
/// Nothing declared and nothing stored means there is nothing to do; a
/// store at least as large as a non-zero declared total is complete.
pub fn is_up_to_date(declared_total: u64, stored_documents: usize) -> bool {
    let stored = stored_documents as u64;
    (declared_total == 0 && stored == 0) || (declared_total > 0 && stored >= declared_total)
}

/// Crawls `authors` one after another into `root`
pub async fn run_batch(
    coordinator: &mut Coordinator,
    root: &Path,
    authors: &[TrackedAuthor],
    options: &BatchConfig,
) -> BatchReport {
    let mut report = BatchReport::default();
    let limit = if options.max_authors == 0 {
        authors.len()
    } else {
        options.max_authors.min(authors.len())
    };

    tracing::info!("Batch over {} of {} registered authors", limit, authors.len());

    for (position, author) in authors.iter().take(limit).enumerate() {
        tracing::info!("[{}/{}] {}", position + 1, limit, author);

        let declared_total = match coordinator.probe_total(author).await {
            Ok(total) => total,
            Err(e) => {
                tracing::error!("Check failed for {}: {}", author, e);
                report.failed.push((author.clone(), e.to_string()));
                if options.stop_on_fail {
                    break;
                }
                continue;
            }
        };

        let stored = match AuthorLayout::new(root, author).document_count() {
            Ok(count) => count,
            Err(e) => {
                tracing::error!("Cannot count documents of {}: {}", author, e);
                report.failed.push((author.clone(), e.to_string()));
                if options.stop_on_fail {
                    break;
                }
                continue;
            }
        };

        if is_up_to_date(declared_total, stored) {
            tracing::info!(
                "Skipping {}: {} stored, {} declared",
                author,
                stored,
                declared_total
            );
            report.skipped.push(author.clone());
            continue;
        }

        match coordinator.crawl_into(root, author).await {
            Ok(result) => report.completed.push((author.clone(), result)),
            Err(e) => {
                tracing::error!("Download failed for {}: {}", author, e);
                report.failed.push((author.clone(), e.to_string()));
                if options.stop_on_fail {
                    break;
                }
            }
        }
    }

    tracing::info!(
        "Batch finished: {} completed, {} skipped, {} failed",
        report.completed.len(),
        report.skipped.len(),
        report.failed.len()
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlerConfig, EndpointConfig};
    use crate::crawler::fetcher::{FetchRequest, Fetcher};
    use crate::crawler::pacing::RecordingPacer;
    use crate::HarvestError;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// One result for "David Silver", none for "Nobody", a 503 for "Broken"
    /// and an unparseable feed for "Garbled"
    struct RegistryFetcher;

    #[async_trait]
    impl Fetcher for RegistryFetcher {
        async fn fetch(&self, request: &FetchRequest<'_>) -> Result<String, HarvestError> {
            let url = url::Url::parse(request.url)?;
            if url.path().starts_with("/abs/") {
                return Ok("<html/>".to_string());
            }
            let query = url
                .query_pairs()
                .find(|(key, _)| key == "search_query")
                .map(|(_, value)| value.into_owned())
                .unwrap_or_default();

            if query.contains("Broken") {
                return Err(HarvestError::Status {
                    url: request.url.to_string(),
                    status: 503,
                });
            }
            if query.contains("Garbled") {
                return Ok("<feed><entry></feed>".to_string());
            }
            if query.contains("David Silver") {
                return Ok("<feed><totalResults>1</totalResults><entry>\
                           <id>http://arxiv.org/abs/2101.00001v1</id>\
                           <author><name>David Silver</name></author></entry></feed>"
                    .to_string());
            }
            Ok("<feed><totalResults>0</totalResults></feed>".to_string())
        }
    }

    fn coordinator() -> Coordinator {
        let endpoints = EndpointConfig {
            query_url: "http://query.test/api/query".to_string(),
            document_url: "http://docs.test/abs/".to_string(),
            ..EndpointConfig::default()
        };
        Coordinator::new(
            CrawlerConfig::default(),
            endpoints,
            Arc::new(RegistryFetcher),
            Arc::new(RecordingPacer::new()),
            StdRng::seed_from_u64(5),
        )
    }

    fn author(last: &str, first: &str) -> TrackedAuthor {
        TrackedAuthor::new(last, first).unwrap()
    }

    #[test]
    fn test_is_up_to_date() {
        assert!(is_up_to_date(0, 0));
        assert!(!is_up_to_date(0, 3));
        assert!(is_up_to_date(5, 5));
        assert!(is_up_to_date(5, 7));
        assert!(!is_up_to_date(5, 4));
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_batch() {
        let dir = TempDir::new().unwrap();
        let authors = vec![
            author("Broken", "Bob"),
            author("Nobody", "Jane"),
            author("Silver", "David"),
        ];

        let mut crawl = coordinator();
        let report = run_batch(&mut crawl, dir.path(), &authors, &BatchConfig::default()).await;

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, authors[0]);
        assert_eq!(report.skipped, vec![authors[1].clone()]);
        assert_eq!(report.completed.len(), 1);
        assert_eq!(report.completed[0].1.matched_count, 1);
        assert_eq!(report.processed(), 3);
        assert!(dir
            .path()
            .join("AUTHORS/Silver-David/HTML/2101.00001.html")
            .is_file());
    }

    #[tokio::test]
    async fn test_unparseable_total_fails_only_that_author() {
        let dir = TempDir::new().unwrap();
        let authors = vec![author("Garbled", "Gina"), author("Silver", "David")];

        let mut crawl = coordinator();
        let report = run_batch(&mut crawl, dir.path(), &authors, &BatchConfig::default()).await;

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, authors[0]);
        assert!(report.failed[0].1.starts_with("Feed parse error"));
        assert_eq!(report.completed.len(), 1);
        assert_eq!(report.completed[0].0, authors[1]);
        assert!(!dir.path().join("AUTHORS/Garbled-Gina").exists());
    }

    #[tokio::test]
    async fn test_complete_author_is_skipped_on_second_run() {
        let dir = TempDir::new().unwrap();
        let authors = vec![author("Silver", "David")];
        let mut crawl = coordinator();

        let first = run_batch(&mut crawl, dir.path(), &authors, &BatchConfig::default()).await;
        assert_eq!(first.completed.len(), 1);

        let second = run_batch(&mut crawl, dir.path(), &authors, &BatchConfig::default()).await;
        assert!(second.completed.is_empty());
        assert_eq!(second.skipped.len(), 1);
    }

    #[tokio::test]
    async fn test_stop_on_fail_and_max_authors() {
        let dir = TempDir::new().unwrap();
        let authors = vec![
            author("Broken", "Bob"),
            author("Silver", "David"),
            author("Nobody", "Jane"),
        ];
        let mut crawl = coordinator();

        let stop = BatchConfig {
            stop_on_fail: true,
            max_authors: 0,
        };
        let report = run_batch(&mut crawl, dir.path(), &authors, &stop).await;
        assert!(report.has_failures());
        assert_eq!(report.processed(), 1);

        let limited = BatchConfig {
            stop_on_fail: false,
            max_authors: 2,
        };
        let report = run_batch(&mut crawl, dir.path(), &authors, &limited).await;
        assert_eq!(report.processed(), 2);
        assert!(report.skipped.is_empty());
    }
}
