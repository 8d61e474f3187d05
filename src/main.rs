//! Driftnet main entry point
//!
//! This is the command-line interface for the Driftnet crawler.

use anyhow::{bail, Context};
use clap::Parser;
use driftnet::config::{load_config_with_hash, Config};
use driftnet::crawler::{crawl_site, CrawlOptions, CrawlReport};
use driftnet::matcher::{spawn_sink, Matcher, WordMatcher};
use driftnet::output::{print_report, write_hits};
use driftnet::site::ConfiguredSite;
use driftnet::{Browser, DriftError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Driftnet: a concurrent page-graph crawler
///
/// Driftnet crawls each configured site with a pool of workers and records
/// every page whose contents contain all of the configured words.
#[derive(Parser, Debug)]
#[command(name = "driftnet")]
#[command(version)]
#[command(about = "A concurrent page-graph crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Override the configured number of workers
    #[arg(short, long, value_name = "N")]
    workers: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(workers) = cli.workers {
        if !(1..=100).contains(&workers) {
            bail!("--workers must be between 1 and 100, got {}", workers);
        }
        config.crawler.workers = workers;
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("driftnet=info,warn"),
            1 => EnvFilter::new("driftnet=debug,info"),
            2 => EnvFilter::new("driftnet=trace,debug"),
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

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config) {
    println!("=== Driftnet Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Workers: {}", config.crawler.workers);
    println!("  Sink capacity: {}", config.crawler.sink_capacity);

    println!("\nBrowser:");
    println!("  User agent: {}", config.browser.user_agent);
    println!("  Accept-Language: {}", config.browser.accept_language);
    println!("  Timeout: {}s", config.browser.timeout_secs);

    println!("\nMatcher:");
    println!("  Words: {}", config.matcher.words.join(", "));

    println!("\nOutput:");
    match &config.output.hits_path {
        Some(path) => println!("  Hits: {}", path),
        None => println!("  Hits: stdout only"),
    }

    println!("\nSites ({}):", config.sites.len());
    for entry in &config.sites {
        match entry {
            driftnet::config::SiteEntry::Links { start_url } => {
                println!("  - {} (links)", start_url);
            }
            driftnet::config::SiteEntry::Paginated {
                start_url,
                endpoint,
                selector,
                ..
            } => {
                println!("  - {} (paginated)", start_url);
                println!("    * endpoint: {}", endpoint);
                println!("    * selector: {}", selector);
            }
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} sites", config.sites.len());
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let browser = Arc::new(Browser::new(&config.browser).context("Failed to build HTTP client")?);
    let (sink, sink_task) = spawn_sink(config.crawler.sink_capacity as usize);
    let matcher: Arc<dyn Matcher> = Arc::new(WordMatcher::new(&config.matcher.words, sink));
    let options = CrawlOptions::from(&config.crawler);

    let mut crawled = 0usize;
    for entry in &config.sites {
        let site = ConfiguredSite::from_entry(entry)
            .with_context(|| format!("Invalid site {}", entry.start_url()))?;

        match crawl_configured(&site, &browser, &matcher, options).await {
            Ok(report) => {
                crawled += 1;
                print_report(site.start_url(), &report);
            }
            Err(e) => {
                tracing::error!("Skipping {}: {}", site.start_url(), e);
            }
        }
    }

    // The sink finishes once the last matcher handle is gone
    drop(matcher);
    let hits = sink_task.finish().await?;

    println!("=== Matches ({}) ===\n", hits.len());
    for hit in &hits {
        println!("  - {}", hit.url);
    }
    println!();

    if let Some(path) = &config.output.hits_path {
        match write_hits(&hits, Path::new(path)) {
            Ok(()) => println!("✓ Hits written to: {}", path),
            Err(e) => tracing::error!("Failed to write hits to {}: {}", path, e),
        }
    }

    tracing::info!(
        "Crawled {} of {} sites, {} matches",
        crawled,
        config.sites.len(),
        hits.len()
    );

    Ok(())
}

async fn crawl_configured(
    site: &ConfiguredSite,
    browser: &Arc<Browser>,
    matcher: &Arc<dyn Matcher>,
    options: CrawlOptions,
) -> Result<CrawlReport, DriftError> {
    match site {
        ConfiguredSite::Links(site) => {
            crawl_site(Arc::clone(site), Arc::clone(browser), Arc::clone(matcher), options).await
        }
        ConfiguredSite::Paginated(site) => {
            crawl_site(Arc::clone(site), Arc::clone(browser), Arc::clone(matcher), options).await
        }
    }
}
