//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the per-author crawl loop that coordinates:
//! - Page-by-page pagination, reusing cached pages on resume
//! - Parsing and persisting each query page
//! - Deduplicating, matching and fetching documents per entry
//! - Politeness jitter and the total time budget

use crate::authors::TrackedAuthor;
use crate::config::{Config, CrawlerConfig, EndpointConfig};
use crate::crawler::fetcher::{FetchRequest, Fetcher, HttpFetcher};
use crate::crawler::pacing::{JitterWindow, Pacer, TokioPacer};
use crate::crawler::parser::{parse_feed, FeedPage};
use crate::state::{Pagination, SeenIds, Termination};
use crate::storage::{AuthorLayout, DocumentRecord, DocumentStore, PageCache};
use crate::url::{build_document_url, build_query_url};
use crate::HarvestError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Summary of one completed author crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    /// Pages processed, from cache or network
    pub pages_fetched: u32,

    /// Pages that needed a network fetch
    pub network_pages: u32,

    /// Total declared on page 1 (0 if never declared)
    pub declared_total: u64,

    /// Unique entries selected by the match policy, cached or not
    pub matched_count: usize,

    pub page_cache_location: PathBuf,

    pub document_store_location: PathBuf,

    pub termination: Termination,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    crawler: CrawlerConfig,
    endpoints: EndpointConfig,
    fetcher: Arc<dyn Fetcher>,
    pacer: Arc<dyn Pacer>,
    rng: StdRng,
}

impl Coordinator {
    /// Creates a coordinator from explicit parts
    ///
    /// # Arguments
    ///
    /// * `crawler` - Page size, jitter windows, budgets and match policy
    /// * `endpoints` - Query and document endpoints
    /// * `fetcher` - Source of response bodies
    /// * `pacer` - Receives every jitter pause
    /// * `rng` - Jitter source
    pub fn new(
        crawler: CrawlerConfig,
        endpoints: EndpointConfig,
        fetcher: Arc<dyn Fetcher>,
        pacer: Arc<dyn Pacer>,
        rng: StdRng,
    ) -> Self {
        Self {
            crawler,
            endpoints,
            fetcher,
            pacer,
            rng,
        }
    }

    /// Creates a coordinator backed by the HTTP fetcher and real sleeps
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let pacer: Arc<dyn Pacer> = Arc::new(TokioPacer);
        let fetcher = Arc::new(HttpFetcher::from_config(config, pacer.clone())?);
        let rng = match config.crawler.seed {
            // Offset so jitter and identity rotation draw different streams
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_os_rng(),
        };

        Ok(Self::new(
            config.crawler.clone(),
            config.endpoints.clone(),
            fetcher,
            pacer,
            rng,
        ))
    }

    /// Crawls an author into the standard layout under `root`
    pub async fn crawl_into(
        &mut self,
        root: &Path,
        author: &TrackedAuthor,
    ) -> Result<CrawlResult, HarvestError> {
        let layout = AuthorLayout::new(root, author);
        let (pages, documents) = layout.open(author)?;
        self.crawl_author(author, &pages, &documents).await
    }

    /// Crawls every page of an author's results
    ///
    /// Cached pages are reused without any network request. A page fetched
    /// from the network is parsed before it is persisted, so a malformed
    /// response never enters the cache. Documents already on disk are
    /// neither fetched again nor followed by a pause.
    ///
    /// # Errors
    ///
    /// Any fetch, parse or storage error aborts the crawl, as does
    /// exceeding the total budget (`HarvestError::BudgetExceeded`).
    /// Artifacts persisted before the error are kept.
    pub async fn crawl_author(
        &mut self,
        author: &TrackedAuthor,
        pages: &PageCache,
        documents: &DocumentStore,
    ) -> Result<CrawlResult, HarvestError> {
        let started = Instant::now();
        let author_key = author.key();
        let page_window =
            JitterWindow::from_secs(self.crawler.page_delay_min, self.crawler.page_delay_max);
        let document_window = JitterWindow::from_secs(
            self.crawler.document_delay_min,
            self.crawler.document_delay_max,
        );

        let mut cursor = Pagination::new(self.crawler.page_size);
        let mut seen = SeenIds::new();
        let mut pages_fetched = 0u32;
        let mut network_pages = 0u32;
        let mut matched_count = 0usize;

        tracing::info!("Crawling {} ({})", author, author.query_expression());

        let termination = loop {
            let page_index = cursor.begin_page();
            let query_url = build_query_url(
                &self.endpoints.query_url,
                author,
                cursor.offset(),
                self.crawler.page_size,
            )?;

            let (page, from_network) = match pages.load(page_index) {
                Some(page) => {
                    tracing::debug!("Page {} of {} served from cache", page_index, author_key);
                    (page, false)
                }
                None => {
                    let request = FetchRequest::new(query_url.as_str())
                        .with_accept(&self.endpoints.query_accept);
                    let raw = self.fetcher.fetch(&request).await?;
                    let page = FeedPage::parse(&author_key, page_index, raw)?;
                    pages.store(&page)?;
                    (page, true)
                }
            };

            pages_fetched += 1;
            if from_network {
                network_pages += 1;
            }
            cursor.record_total(page.declared_total);

            tracing::info!(
                "Page {} of {}: {} entries at offset {} (declared total {})",
                page_index,
                author_key,
                page.entries.len(),
                cursor.offset(),
                cursor.declared_total()
            );

            for entry in &page.entries {
                if !seen.insert(&entry.external_id) {
                    tracing::debug!("Skipping repeated entry {}", entry.external_id);
                    continue;
                }
                if !self
                    .crawler
                    .match_policy
                    .selects(author, entry.author_names.as_slice())
                {
                    continue;
                }

                matched_count += 1;
                if documents.contains(&entry.external_id) {
                    tracing::debug!("Document {} already stored", entry.external_id);
                    continue;
                }

                let document_url =
                    build_document_url(&self.endpoints.document_url, &entry.external_id)?;
                let request = FetchRequest::new(document_url.as_str())
                    .with_accept(&self.endpoints.document_accept)
                    .with_referer(query_url.as_str());
                let body = self.fetcher.fetch(&request).await?;
                documents.store(&DocumentRecord::new(&entry.external_id, body))?;
                tracing::info!("Stored document {}", entry.external_id);

                let pause = document_window.draw(&mut self.rng);
                self.pacer.pause(pause).await;
            }

            if let Some(termination) = cursor.finish_page(page.entries.len()) {
                break termination;
            }

            if let Some(limit) = self.crawler.total_limit() {
                let elapsed = started.elapsed();
                if elapsed > limit {
                    tracing::error!(
                        "Crawl of {} stopped after {:.1}s, over the {:.1}s budget",
                        author,
                        elapsed.as_secs_f64(),
                        limit.as_secs_f64()
                    );
                    return Err(HarvestError::BudgetExceeded {
                        author: author_key,
                        elapsed,
                        limit,
                    });
                }
            }

            if from_network {
                let pause = page_window.draw(&mut self.rng);
                tracing::debug!("Sleeping {:.2}s before next page", pause.as_secs_f64());
                self.pacer.pause(pause).await;
            }
        };

        tracing::info!(
            "Finished {}: {} pages ({} from network), {} matched, stopped on {}",
            author,
            pages_fetched,
            network_pages,
            matched_count,
            termination
        );

        Ok(CrawlResult {
            pages_fetched,
            network_pages,
            declared_total: cursor.declared_total(),
            matched_count,
            page_cache_location: pages.location().to_path_buf(),
            document_store_location: documents.location().to_path_buf(),
            termination,
        })
    }

    /// Asks the service how many results an author has
    ///
    /// Sends a single-result query and is never cached.
    pub async fn probe_total(&self, author: &TrackedAuthor) -> Result<u64, HarvestError> {
        let url = build_query_url(&self.endpoints.query_url, author, 0, 1)?;
        let request = FetchRequest::new(url.as_str()).with_accept(&self.endpoints.query_accept);
        let raw = self.fetcher.fetch(&request).await?;
        let parsed = parse_feed(&raw)?;
        tracing::debug!("{} declares {} results", author, parsed.declared_total);
        Ok(parsed.declared_total)
    }
}
