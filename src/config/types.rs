use crate::authors::MatchPolicy;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for arxiv-ripple
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub endpoints: EndpointConfig,
    pub client: ClientConfig,
    pub output: OutputConfig,
    pub batch: BatchConfig,
}

/// Crawl loop behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of results requested per query page
    pub page_size: u32,

    /// Pauses between fetch attempts (seconds); attempts = len + 1
    pub retry_delays: Vec<u64>,

    /// Jitter window after a query page fetched from the network (seconds)
    pub page_delay_min: f64,
    pub page_delay_max: f64,

    /// Jitter window after a document fetched from the network (seconds)
    pub document_delay_min: f64,
    pub document_delay_max: f64,

    /// Transport timeout for a single request (seconds)
    pub request_timeout: u64,

    /// A single attempt slower than this aborts the crawl (seconds)
    pub max_request_seconds: Option<f64>,

    /// Total wall-clock budget for one author's crawl (seconds)
    pub max_total_seconds: Option<f64>,

    /// Which author names of an entry are tested against the tracked author
    pub match_policy: MatchPolicy,

    /// Seed for identity rotation and jitter; random when absent
    pub seed: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            retry_delays: vec![5, 15, 30],
            page_delay_min: 4.0,
            page_delay_max: 8.0,
            document_delay_min: 1.1,
            document_delay_max: 3.3,
            request_timeout: 30,
            max_request_seconds: None,
            max_total_seconds: None,
            match_policy: MatchPolicy::AnyAuthor,
            seed: None,
        }
    }
}

impl CrawlerConfig {
    pub fn retry_schedule(&self) -> Vec<Duration> {
        self.retry_delays
            .iter()
            .map(|secs| Duration::from_secs(*secs))
            .collect()
    }

    /// `None` when unset or not representable as a `Duration`
    pub fn request_limit(&self) -> Option<Duration> {
        self.max_request_seconds
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    pub fn total_limit(&self) -> Option<Duration> {
        self.max_total_seconds
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

/// Remote endpoints and the Accept header sent to each
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EndpointConfig {
    /// Paginated Atom query endpoint
    pub query_url: String,

    /// Abstract page prefix; the canonical id is appended
    pub document_url: String,

    pub query_accept: String,

    pub document_accept: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            query_url: "https://export.arxiv.org/api/query".to_string(),
            document_url: "https://arxiv.org/abs/".to_string(),
            query_accept: "application/atom+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
            document_accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                .to_string(),
        }
    }
}

/// Client identity settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientConfig {
    /// User-Agent rotation pool; one is picked per attempt
    pub user_agents: Vec<String>,

    pub accept_language: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agents: vec![
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                 Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 \
                 (KHTML, like Gecko) Version/17.2 Safari/605.1.15"
                    .to_string(),
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:122.0) Gecko/20100101 \
                 Firefox/122.0"
                    .to_string(),
            ],
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory holding the AUTHORS/ cache tree
    pub root_dir: PathBuf,

    /// Tracked-author registry (CSV)
    pub registry_path: PathBuf,

    /// Default destination of the CSV index export
    pub export_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            registry_path: PathBuf::from("authors.csv"),
            export_path: PathBuf::from("papers.csv"),
        }
    }
}

/// Batch mode settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BatchConfig {
    /// Stop the batch at the first failed author
    pub stop_on_fail: bool,

    /// Only process the first N registered authors (0 = all)
    pub max_authors: usize,
}
