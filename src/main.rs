//! arxiv-ripple main entry point
//!
//! This is the command-line interface for the arxiv-ripple author harvester.

use anyhow::{bail, Context};
use arxiv_ripple::authors::{append_author, load_authors, TrackedAuthor};
use arxiv_ripple::config::{load_config_with_hash, validate, Config};
use arxiv_ripple::crawler::{crawl, run_batch, Coordinator};
use arxiv_ripple::output::{build_index, IndexSelection};
use arxiv_ripple::storage::AUTHORS_DIR;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// arxiv-ripple: a polite, resumable arXiv author harvester
///
/// With LAST and FIRST, the author is added to the registry and crawled.
/// Without names, every registered author is crawled in turn. Interrupted
/// crawls resume from the on-disk cache.
#[derive(Parser, Debug)]
#[command(name = "arxiv-ripple")]
#[command(version = "1.0.0")]
#[command(about = "A polite, resumable arXiv author harvester", long_about = None)]
struct Cli {
    /// Author last name
    #[arg(value_name = "LAST", requires = "first")]
    last: Option<String>,

    /// Author first name
    #[arg(value_name = "FIRST")]
    first: Option<String>,

    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Build the CSV paper index from cached pages and exit
    #[arg(long, value_name = "PATH", conflicts_with_all = ["last", "dry_run"])]
    export: Option<Option<PathBuf>>,

    /// Index only papers where the tracked author is listed first
    #[arg(long, requires = "export")]
    first_author: bool,

    /// Abort when a single request takes longer than this (seconds)
    #[arg(long, value_name = "SECONDS")]
    max_request_seconds: Option<f64>,

    /// Abort an author's crawl after this much wall-clock time (seconds)
    #[arg(long, value_name = "SECONDS")]
    max_total_seconds: Option<f64>,

    /// Pauses between fetch attempts, e.g. 5,15,30
    #[arg(long, value_name = "SECONDS", value_delimiter = ',')]
    retry_delays: Option<Vec<u64>>,

    /// Only crawl the first N registered authors
    #[arg(long, value_name = "N")]
    max_authors: Option<usize>,

    /// Stop the batch at the first failed author
    #[arg(long)]
    stop_on_fail: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid settings")?;

    if let Some(export) = &cli.export {
        let output = export
            .clone()
            .unwrap_or_else(|| config.output.export_path.clone());
        return handle_export(&config, output, cli.first_author);
    }

    let single = match (&cli.last, &cli.first) {
        (Some(last), Some(first)) => Some(
            TrackedAuthor::new(last, first)
                .with_context(|| format!("Invalid author name: {:?} {:?}", last, first))?,
        ),
        _ => None,
    };

    if cli.dry_run {
        return handle_dry_run(&config, single.as_ref());
    }

    match single {
        Some(author) => handle_single(&config, &author).await,
        None => handle_batch(&config).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("arxiv_ripple=info,warn"),
            1 => EnvFilter::new("arxiv_ripple=debug,info"),
            2 => EnvFilter::new("arxiv_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Command-line flags win over the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(seconds) = cli.max_request_seconds {
        config.crawler.max_request_seconds = Some(seconds);
    }
    if let Some(seconds) = cli.max_total_seconds {
        config.crawler.max_total_seconds = Some(seconds);
    }
    if let Some(delays) = &cli.retry_delays {
        config.crawler.retry_delays = delays.clone();
    }
    if let Some(max_authors) = cli.max_authors {
        config.batch.max_authors = max_authors;
    }
    if cli.stop_on_fail {
        config.batch.stop_on_fail = true;
    }
}

/// Handles the --export mode: writes the CSV paper index
fn handle_export(config: &Config, output: PathBuf, first_author: bool) -> anyhow::Result<()> {
    let authors_dir = config.output.root_dir.join(AUTHORS_DIR);
    if !authors_dir.is_dir() {
        bail!("Missing authors directory: {}", authors_dir.display());
    }

    let selection = if first_author {
        IndexSelection::FirstAuthor
    } else {
        IndexSelection::AllEntries
    };
    let report = build_index(&authors_dir, &output, selection)?;

    println!("Wrote {} rows to {}", report.papers.len(), output.display());
    if report.unreadable > 0 {
        eprintln!("Skipped {} unreadable XML file(s)", report.unreadable);
    }
    Ok(())
}

/// Handles the --dry-run mode: shows the effective settings and the authors
fn handle_dry_run(config: &Config, single: Option<&TrackedAuthor>) -> anyhow::Result<()> {
    println!("=== arxiv-ripple Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Page size: {}", config.crawler.page_size);
    println!("  Retry delays: {:?}s", config.crawler.retry_delays);
    println!(
        "  Page jitter: {:.1}-{:.1}s",
        config.crawler.page_delay_min, config.crawler.page_delay_max
    );
    println!(
        "  Document jitter: {:.1}-{:.1}s",
        config.crawler.document_delay_min, config.crawler.document_delay_max
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!("  Match policy: {:?}", config.crawler.match_policy);

    println!("\nEndpoints:");
    println!("  Query: {}", config.endpoints.query_url);
    println!("  Documents: {}", config.endpoints.document_url);

    println!("\nOutput:");
    println!("  Root: {}", config.output.root_dir.display());
    println!("  Registry: {}", config.output.registry_path.display());

    match single {
        Some(author) => println!("\nWould crawl {} ({})", author, author.query_expression()),
        None => {
            let authors = load_authors(&config.output.registry_path)?;
            println!("\nRegistered authors ({}):", authors.len());
            for author in &authors {
                println!("  - {}", author);
            }
        }
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Registers and crawls one author
async fn handle_single(config: &Config, author: &TrackedAuthor) -> anyhow::Result<()> {
    append_author(&config.output.registry_path, author)?;

    let result = match crawl(config, author).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Download failed: {}", e);
            return Err(e.into());
        }
    };

    if result.declared_total > 0 {
        println!(
            "Saved {} API page(s), {} papers ({} results) for {} to {} and {}",
            result.pages_fetched,
            result.matched_count,
            result.declared_total,
            author,
            result.page_cache_location.display(),
            result.document_store_location.display()
        );
    } else {
        println!(
            "No results for {}; saved {} API page(s) to {}",
            author,
            result.pages_fetched,
            result.page_cache_location.display()
        );
    }
    Ok(())
}

/// Crawls every registered author
async fn handle_batch(config: &Config) -> anyhow::Result<()> {
    let registry = &config.output.registry_path;
    let authors = load_authors(registry)?;
    if authors.is_empty() {
        bail!("No authors found in {}", registry.display());
    }

    let mut coordinator = Coordinator::from_config(config)?;
    let report = run_batch(
        &mut coordinator,
        &config.output.root_dir,
        &authors,
        &config.batch,
    )
    .await;

    println!(
        "{} crawled, {} up to date, {} failed",
        report.completed.len(),
        report.skipped.len(),
        report.failed.len()
    );
    for (author, reason) in &report.failed {
        eprintln!("  {}: {}", author, reason);
    }
    Ok(())
}
