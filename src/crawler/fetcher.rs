//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client from configuration
//! - Rotating the client identity (User-Agent) per attempt
//! - Retry with a fixed backoff schedule for transient failures
//! - Detection of pathologically slow requests

use crate::config::Config;
use crate::crawler::pacing::Pacer;
use crate::HarvestError;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::Client;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// One GET request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest<'a> {
    pub url: &'a str,
    pub referer: Option<&'a str>,
    pub accept: Option<&'a str>,
}

impl<'a> FetchRequest<'a> {
    pub fn new(url: &'a str) -> Self {
        Self {
            url,
            referer: None,
            accept: None,
        }
    }

    pub fn with_referer(mut self, referer: &'a str) -> Self {
        self.referer = Some(referer);
        self
    }

    pub fn with_accept(mut self, accept: &'a str) -> Self {
        self.accept = Some(accept);
        self
    }
}

/// Source of response bodies
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a URL and returns the body text
    async fn fetch(&self, request: &FetchRequest<'_>) -> Result<String, HarvestError>;
}

/// Retry schedule and slowness limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause after failed attempt k; attempts = len + 1
    pub retry_delays: Vec<Duration>,

    /// An attempt slower than this aborts without retrying
    pub max_attempt_duration: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_delays: vec![
                Duration::from_secs(5),
                Duration::from_secs(15),
                Duration::from_secs(30),
            ],
            max_attempt_duration: None,
        }
    }
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> usize {
        self.retry_delays.len() + 1
    }
}

/// Builds an HTTP client with the configured transport timeout
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed fetcher
pub struct HttpFetcher {
    client: Client,
    identities: Vec<String>,
    accept_language: String,
    policy: RetryPolicy,
    rng: Mutex<StdRng>,
    pacer: Arc<dyn Pacer>,
}

impl HttpFetcher {
    pub fn new(
        client: Client,
        identities: Vec<String>,
        accept_language: String,
        policy: RetryPolicy,
        rng: StdRng,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            client,
            identities,
            accept_language,
            policy,
            rng: Mutex::new(rng),
            pacer,
        }
    }

    /// Builds a fetcher from configuration
    ///
    /// The identity RNG is seeded from `crawler.seed` when present.
    pub fn from_config(config: &Config, pacer: Arc<dyn Pacer>) -> Result<Self, HarvestError> {
        let client = build_http_client(Duration::from_secs(config.crawler.request_timeout))?;
        let rng = match config.crawler.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let policy = RetryPolicy {
            retry_delays: config.crawler.retry_schedule(),
            max_attempt_duration: config.crawler.request_limit(),
        };

        Ok(Self::new(
            client,
            config.client.user_agents.clone(),
            config.client.accept_language.clone(),
            policy,
            rng,
            pacer,
        ))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn pick_identity(&self) -> Option<String> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.identities.choose(&mut *rng).cloned()
    }

    /// Performs a single attempt
    async fn attempt(&self, request: &FetchRequest<'_>) -> Result<String, HarvestError> {
        let mut builder = self
            .client
            .get(request.url)
            .header(ACCEPT_LANGUAGE, &self.accept_language);

        if let Some(identity) = self.pick_identity() {
            builder = builder.header(USER_AGENT, identity);
        }
        if let Some(accept) = request.accept {
            builder = builder.header(ACCEPT, accept);
        }
        if let Some(referer) = request.referer {
            builder = builder.header(REFERER, referer);
        }

        let response = builder.send().await.map_err(|e| HarvestError::Transport {
            url: request.url.to_string(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Status {
                url: request.url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| HarvestError::Transport {
            url: request.url.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches a URL with retry logic
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Transport error | Retry after `retry_delays[k]` |
    /// | Non-2xx status | Retry after `retry_delays[k]` |
    /// | Attempt slower than the limit | Immediate `SlowFetch` |
    /// | Schedule exhausted | `FetchFailed` wrapping the last error |
    async fn fetch(&self, request: &FetchRequest<'_>) -> Result<String, HarvestError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            tracing::debug!("GET {} (attempt {})", request.url, attempt);

            let started = Instant::now();
            let outcome = self.attempt(request).await;
            let elapsed = started.elapsed();

            if let Some(limit) = self.policy.max_attempt_duration {
                if elapsed > limit {
                    tracing::warn!(
                        "Request to {} took {:.1}s, over the {:.1}s limit",
                        request.url,
                        elapsed.as_secs_f64(),
                        limit.as_secs_f64()
                    );
                    return Err(HarvestError::SlowFetch {
                        url: request.url.to_string(),
                        elapsed,
                        limit,
                    });
                }
            }

            let error = match outcome {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() => e,
                Err(e) => return Err(e),
            };

            match self.policy.retry_delays.get(attempt - 1) {
                Some(delay) => {
                    tracing::warn!(
                        "Attempt {} for {} failed: {}; retrying in {:?}",
                        attempt,
                        request.url,
                        error,
                        delay
                    );
                    self.pacer.pause(*delay).await;
                }
                None => {
                    tracing::error!("Giving up on {} after {} attempts", request.url, attempt);
                    return Err(HarvestError::FetchFailed {
                        url: request.url.to_string(),
                        attempts: attempt,
                        source: Box::new(error),
                    });
                }
            }
        }
    }
}
