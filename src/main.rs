//! Match-Crawler main entry point
//!
//! This is the command-line shell around the crawl controller: it loads the
//! configuration, wires Ctrl-C to a cooperative stop, and reports the outcome.

use anyhow::Context;
use clap::Parser;
use match_crawler::config::{load_config_with_hash, Config};
use match_crawler::crawler::{CrawlController, CrawlOutcome};
use match_crawler::output::{load_statistics, print_statistics};
use match_crawler::storage::FsArtifactStore;
use match_crawler::StopHandle;
use std::future::Future;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Match-Crawler: a rate-limited, resumable match crawler
///
/// Starting from one account, alternately fetches each account's recent
/// matches and each match's participants, saving every match body and
/// timeline to the data directory.
#[derive(Parser, Debug)]
#[command(name = "match-crawler")]
#[command(version)]
#[command(about = "A rate-limited, resumable match crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// API key; overrides api-key from the configuration file
    #[arg(long, env = "MATCH_CRAWLER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Rebuild state from the data directory before crawling (default behavior)
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Start from the root account only, ignoring files already on disk
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the data directory and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config, cli.api_key.clone())
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, !cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("match_crawler=info,warn"),
            1 => EnvFilter::new("match_crawler=debug,info"),
            2 => EnvFilter::new("match_crawler=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Match-Crawler Dry Run ===\n");

    println!("API:");
    println!("  Base URL: {}", config.api.base_url);
    println!("  API key: {} characters", config.api.api_key.len());

    println!("\nCrawler Configuration:");
    println!("  Root account: {}", config.crawler.root_account_id);
    println!(
        "  Max requests per minute: {}",
        config.crawler.max_requests_per_minute
    );
    println!(
        "  Max matches to crawl: {}",
        config.crawler.max_matches_to_crawl
    );

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_directory);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: summarizes the data directory
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Data directory: {}\n", config.output.data_directory);

    let store = FsArtifactStore::open_existing(&config.output.data_directory)?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, resume: bool) -> anyhow::Result<()> {
    let (mut controller, feed) = CrawlController::new(config)?;

    if resume {
        tracing::info!("Rebuilding state from existing artifacts");
        let summary = controller.load_existing()?;
        tracing::info!(
            "Resumed with {} matches, {} accounts queued, {} orphans removed",
            summary.matches_loaded,
            controller.state().accounts.pending_len(),
            summary.orphans_removed
        );
    } else {
        tracing::info!("Starting fresh crawl (ignoring existing artifacts)");
    }

    // Progress lines already reach the terminal through tracing
    drop(feed.lines);

    let stop = controller.stop_handle();
    tokio::spawn(async move {
        if handle_interrupts(stop, tokio::signal::ctrl_c).await {
            tracing::warn!("Interrupted again, exiting without waiting for the crawl");
            std::process::exit(130);
        }
    });

    let outcome = controller.start().await?;
    let crawled = *feed.crawled.borrow();
    match outcome {
        CrawlOutcome::Completed(reason) => {
            tracing::info!("Crawl completed ({:?}) with {} matches crawled", reason, crawled)
        }
        CrawlOutcome::Stopped => {
            tracing::info!("Crawl stopped with {} matches crawled", crawled)
        }
    }

    Ok(())
}

/// Turns the first interrupt into a cooperative stop
///
/// Returns `true` when a second interrupt arrives before the crawl winds down,
/// `false` if the interrupt source fails.
async fn handle_interrupts<F, Fut>(stop: StopHandle, mut interrupt: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if interrupt().await.is_err() {
        return false;
    }

    stop.stop();
    tracing::info!("Stop pending until the current match finishes; press Ctrl-C again to exit now");

    interrupt().await.is_ok()
}
