//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the query and document
//! endpoints and run full author crawls against a temporary output root.

use arxiv_ripple::authors::{MatchPolicy, TrackedAuthor};
use arxiv_ripple::config::{CrawlerConfig, EndpointConfig};
use arxiv_ripple::crawler::{
    build_http_client, Coordinator, HttpFetcher, RecordingPacer, RetryPolicy,
};
use arxiv_ripple::output::{collect_papers, IndexSelection};
use arxiv_ripple::state::Termination;
use arxiv_ripple::storage::{AuthorLayout, AUTHORS_DIR};
use arxiv_ripple::HarvestError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds an Atom page declaring `total` with one entry per `(id, author)`
fn atom_page(total: u64, entries: &[(String, &str)]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query</title>
  <opensearch:totalResults xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">{}</opensearch:totalResults>
"#,
        total
    );
    for (id, author) in entries {
        xml.push_str(&format!(
            r#"  <entry>
    <id>http://arxiv.org/abs/{}v1</id>
    <published>2021-03-04T05:06:07Z</published>
    <title>Paper {}</title>
    <author><name>{}</name></author>
  </entry>
"#,
            id, id, author
        ));
    }
    xml.push_str("</feed>\n");
    xml
}

fn ids(range: std::ops::Range<u32>, author: &'static str) -> Vec<(String, &'static str)> {
    range.map(|n| (format!("2101.{:05}", n), author)).collect()
}

fn crawler_config(page_size: u32) -> CrawlerConfig {
    CrawlerConfig {
        page_size,
        page_delay_min: 4.0,
        page_delay_max: 8.0,
        document_delay_min: 1.0,
        document_delay_max: 2.0,
        ..CrawlerConfig::default()
    }
}

/// Creates a coordinator talking to the mock server, with recorded pauses
fn create_coordinator(
    server: &MockServer,
    crawler: CrawlerConfig,
    retry_delays: &[u64],
    pacer: Arc<RecordingPacer>,
) -> Coordinator {
    let endpoints = EndpointConfig {
        query_url: format!("{}/api/query", server.uri()),
        document_url: format!("{}/abs/", server.uri()),
        ..EndpointConfig::default()
    };
    let policy = RetryPolicy {
        retry_delays: retry_delays.iter().map(|s| Duration::from_secs(*s)).collect(),
        max_attempt_duration: None,
    };
    let fetcher = HttpFetcher::new(
        build_http_client(Duration::from_secs(5)).expect("client"),
        vec!["TestAgent/1.0".to_string()],
        "en-US,en;q=0.9".to_string(),
        policy,
        StdRng::seed_from_u64(1),
        pacer.clone(),
    );
    Coordinator::new(
        crawler,
        endpoints,
        Arc::new(fetcher),
        pacer,
        StdRng::seed_from_u64(2),
    )
}

async fn mount_page(server: &MockServer, start: u64, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .and(query_param("start", start.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_document(server: &MockServer, id: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/abs/{}", id).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("<html>{}</html>", id)))
        .expect(times)
        .mount(server)
        .await;
}

fn silver() -> TrackedAuthor {
    TrackedAuthor::new("Silver", "David").unwrap()
}

#[tokio::test]
async fn test_three_pages_for_120_results() {
    let server = MockServer::start().await;
    mount_page(&server, 0, atom_page(120, &ids(0..50, "Ann Other")), 1).await;
    mount_page(&server, 50, atom_page(120, &ids(50..100, "Ann Other")), 1).await;
    mount_page(&server, 100, atom_page(120, &ids(100..120, "Ann Other")), 1).await;

    let root = TempDir::new().unwrap();
    let pacer = Arc::new(RecordingPacer::new());
    let mut coordinator = create_coordinator(&server, crawler_config(50), &[], pacer.clone());

    let result = coordinator.crawl_into(root.path(), &silver()).await.unwrap();

    assert_eq!(result.pages_fetched, 3);
    assert_eq!(result.network_pages, 3);
    assert_eq!(result.declared_total, 120);
    assert_eq!(result.matched_count, 0);
    assert_eq!(result.termination, Termination::TotalReached);

    let layout = AuthorLayout::new(root.path(), &silver());
    for index in 1..=3 {
        assert!(layout.pages_dir.join(format!("page-{}.xml", index)).is_file());
    }
    assert!(!layout.pages_dir.join("page-4.xml").exists());

    // page jitter only between pages, never after the last one
    let pauses = pacer.pauses();
    assert_eq!(pauses.len(), 2);
    assert!(pauses
        .iter()
        .all(|p| *p >= Duration::from_secs(4) && *p <= Duration::from_secs(8)));
}

#[tokio::test]
async fn test_resume_makes_no_network_calls() {
    let server = MockServer::start().await;
    let entries = vec![
        ("2101.00001".to_string(), "David Silver"),
        ("2101.00002".to_string(), "Ann Other"),
    ];
    // each endpoint is hit once across both runs
    mount_page(&server, 0, atom_page(2, &entries), 1).await;
    mount_document(&server, "2101.00001", 1).await;

    let root = TempDir::new().unwrap();
    let first_pacer = Arc::new(RecordingPacer::new());
    let mut first = create_coordinator(&server, crawler_config(50), &[], first_pacer.clone());
    let first_result = first.crawl_into(root.path(), &silver()).await.unwrap();
    assert_eq!(first_result.network_pages, 1);
    assert_eq!(first_pacer.pauses().len(), 1);

    let second_pacer = Arc::new(RecordingPacer::new());
    let mut second = create_coordinator(&server, crawler_config(50), &[], second_pacer.clone());
    let second_result = second.crawl_into(root.path(), &silver()).await.unwrap();

    assert_eq!(second_result.network_pages, 0);
    assert_eq!(second_result.pages_fetched, first_result.pages_fetched);
    assert_eq!(second_result.matched_count, 1);
    assert_eq!(second_result.declared_total, 2);
    assert!(second_pacer.pauses().is_empty());
}

#[tokio::test]
async fn test_drifted_entry_is_fetched_once() {
    let server = MockServer::start().await;
    let page_one = vec![
        ("2101.00003".to_string(), "David Silver"),
        ("2101.00002".to_string(), "David Silver"),
    ];
    // a new submission pushed 2101.00002 onto the second page as well
    let page_two = vec![
        ("2101.00002".to_string(), "David Silver"),
        ("2101.00001".to_string(), "D. Silver"),
    ];
    mount_page(&server, 0, atom_page(3, &page_one), 1).await;
    mount_page(&server, 2, atom_page(4, &page_two), 1).await;
    for id in ["2101.00001", "2101.00002", "2101.00003"] {
        mount_document(&server, id, 1).await;
    }

    let root = TempDir::new().unwrap();
    let pacer = Arc::new(RecordingPacer::new());
    let mut coordinator = create_coordinator(&server, crawler_config(2), &[], pacer.clone());

    let result = coordinator.crawl_into(root.path(), &silver()).await.unwrap();

    assert_eq!(result.matched_count, 3);
    assert_eq!(result.declared_total, 3);
    assert_eq!(result.termination, Termination::TotalReached);
    assert_eq!(AuthorLayout::new(root.path(), &silver()).document_count().unwrap(), 3);
    // three document pauses plus one page pause
    assert_eq!(pacer.pauses().len(), 4);
}

#[tokio::test]
async fn test_budget_exceeded_keeps_artifacts_for_resume() {
    let server = MockServer::start().await;
    mount_page(&server, 0, atom_page(100, &ids(0..50, "Ann Other")), 1).await;
    mount_page(&server, 50, atom_page(100, &ids(50..100, "Ann Other")), 1).await;

    let root = TempDir::new().unwrap();
    let mut budgeted = crawler_config(50);
    budgeted.max_total_seconds = Some(1e-9);
    let mut coordinator =
        create_coordinator(&server, budgeted, &[], Arc::new(RecordingPacer::new()));

    let err = coordinator
        .crawl_into(root.path(), &silver())
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::BudgetExceeded { .. }));
    assert!(err.is_budget());

    let layout = AuthorLayout::new(root.path(), &silver());
    assert!(layout.pages_dir.join("page-1.xml").is_file());
    assert!(!layout.pages_dir.join("page-2.xml").exists());

    // page 1 comes from the cache, page 2 from the network
    let mut resumed =
        create_coordinator(&server, crawler_config(50), &[], Arc::new(RecordingPacer::new()));
    let result = resumed.crawl_into(root.path(), &silver()).await.unwrap();
    assert_eq!(result.pages_fetched, 2);
    assert_eq!(result.network_pages, 1);
}

#[tokio::test]
async fn test_stored_document_is_skipped_without_pause() {
    let server = MockServer::start().await;
    let entries = vec![("2101.00001".to_string(), "David Silver")];
    mount_page(&server, 0, atom_page(1, &entries), 1).await;
    mount_document(&server, "2101.00001", 0).await;

    let root = TempDir::new().unwrap();
    let layout = AuthorLayout::new(root.path(), &silver());
    std::fs::create_dir_all(&layout.documents_dir).unwrap();
    std::fs::write(layout.documents_dir.join("2101.00001.html"), "<html/>").unwrap();

    let pacer = Arc::new(RecordingPacer::new());
    let mut coordinator = create_coordinator(&server, crawler_config(50), &[], pacer.clone());
    let result = coordinator.crawl_into(root.path(), &silver()).await.unwrap();

    assert_eq!(result.matched_count, 1);
    assert!(pacer.pauses().is_empty());
}

#[tokio::test]
async fn test_first_author_policy_fetches_only_lead_papers() {
    let server = MockServer::start().await;
    let entries = vec![
        ("2101.00001".to_string(), "Ann Other"),
        ("2101.00002".to_string(), "David Silver"),
    ];
    mount_page(&server, 0, atom_page(2, &entries), 1).await;
    mount_document(&server, "2101.00001", 0).await;
    mount_document(&server, "2101.00002", 1).await;

    let mut config = crawler_config(50);
    config.match_policy = MatchPolicy::FirstAuthor;
    let root = TempDir::new().unwrap();
    let mut coordinator =
        create_coordinator(&server, config, &[], Arc::new(RecordingPacer::new()));

    let result = coordinator.crawl_into(root.path(), &silver()).await.unwrap();
    assert_eq!(result.matched_count, 1);
}

#[tokio::test]
async fn test_transient_failures_follow_backoff_schedule() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_page(&server, 0, atom_page(0, &[]), 1).await;

    let root = TempDir::new().unwrap();
    let pacer = Arc::new(RecordingPacer::new());
    let mut coordinator =
        create_coordinator(&server, crawler_config(50), &[5, 15, 30], pacer.clone());

    let result = coordinator.crawl_into(root.path(), &silver()).await.unwrap();

    assert_eq!(result.termination, Termination::EmptyPage);
    assert_eq!(
        pacer.pauses(),
        vec![Duration::from_secs(5), Duration::from_secs(15)]
    );
}

#[tokio::test]
async fn test_malformed_page_is_not_cached() {
    let server = MockServer::start().await;
    mount_page(&server, 0, "<feed><entry><id>".to_string(), 1).await;

    let root = TempDir::new().unwrap();
    let mut coordinator =
        create_coordinator(&server, crawler_config(50), &[], Arc::new(RecordingPacer::new()));

    let err = coordinator
        .crawl_into(root.path(), &silver())
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::FeedParse(_)));
    let layout = AuthorLayout::new(root.path(), &silver());
    assert!(!layout.pages_dir.join("page-1.xml").exists());
}

#[tokio::test]
async fn test_crawled_pages_feed_the_index() {
    let server = MockServer::start().await;
    let entries = vec![
        ("2101.00001".to_string(), "David Silver"),
        ("2101.00002".to_string(), "Ann Other"),
    ];
    mount_page(&server, 0, atom_page(2, &entries), 1).await;
    mount_document(&server, "2101.00001", 1).await;

    let root = TempDir::new().unwrap();
    let mut coordinator =
        create_coordinator(&server, crawler_config(50), &[], Arc::new(RecordingPacer::new()));
    coordinator.crawl_into(root.path(), &silver()).await.unwrap();

    let authors_dir = root.path().join(AUTHORS_DIR);
    let all = collect_papers(&authors_dir, IndexSelection::AllEntries).unwrap();
    assert_eq!(all.papers.len(), 2);
    assert_eq!(all.papers[0].year, 2021);

    let lead = collect_papers(&authors_dir, IndexSelection::FirstAuthor).unwrap();
    assert_eq!(lead.papers.len(), 1);
    assert_eq!(lead.papers[0].url, "https://arxiv.org/pdf/2101.00001.pdf");
}
