//! Broken Link Checker main entry point
//!
//! This is the command-line interface for the broken link checker.

use anyhow::{bail, Context};
use broken_link_checker::config::{load_config_with_hash, validate_seed_url, Config};
use broken_link_checker::crawler::Coordinator;
use broken_link_checker::output::{
    clean_file, generate_markdown_summary, generate_summary, load_statistics, print_run_stats,
    print_statistics, CrawlSummary, JsonOutputHandler, RecordEmitter, SharedStorage,
    SqliteOutputHandler,
};
use broken_link_checker::storage::{SqliteStorage, Storage};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Broken Link Checker: finds dead links on a website
///
/// Crawls every page under the seed URL's authority, probes external links
/// once, and records links that answer with a reportable status, serve
/// non-HTML content, or fail at the network level.
#[derive(Parser, Debug)]
#[command(name = "broken-link-checker")]
#[command(version)]
#[command(about = "Finds broken links on a website", long_about = None)]
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

    /// Override the seed URL from the configuration
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Validate config and show the effective settings without crawling
    #[arg(long, conflicts_with_all = ["stats", "export_summary", "clean_only"])]
    dry_run: bool,

    /// Show statistics of the latest run in the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary", "clean_only"])]
    stats: bool,

    /// Generate markdown summary of the latest run in the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "clean_only"])]
    export_summary: bool,

    /// Drop contact links (text containing '@') from the JSON output and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "export_summary"])]
    clean_only: bool,

    /// After crawling, also write the contact-filtered JSON output
    #[arg(long)]
    clean: bool,
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

    if let Some(seed) = &cli.seed {
        validate_seed_url(seed).context("Invalid --seed")?;
        config.crawler.seed_url = seed.trim().to_string();
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else if cli.clean_only {
        handle_clean(&config)?;
    } else {
        handle_crawl(&config, &config_hash).await?;
        if cli.clean {
            handle_clean(&config)?;
        }
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
            0 => EnvFilter::new("broken_link_checker=info,warn"),
            1 => EnvFilter::new("broken_link_checker=debug,info"),
            2 => EnvFilter::new("broken_link_checker=trace,debug"),
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

fn database_path(config: &Config) -> anyhow::Result<&Path> {
    match &config.output.database_path {
        Some(path) => Ok(Path::new(path)),
        None => bail!("No database-path configured in [output]"),
    }
}

/// Handles the --dry-run mode: validates config and shows the effective settings
fn handle_dry_run(config: &Config) {
    let settings = config.crawl_settings();

    println!("=== Broken Link Checker Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed URL: {}", settings.seed_url);
    println!(
        "  Reportable statuses: {}",
        settings
            .reportable_statuses
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Max concurrency: {}", settings.max_concurrency);
    println!("  Dispatch delay: {:?}", settings.dispatch_delay);
    println!("  Request timeout: {:?}", settings.request_timeout);
    println!("  Max redirects: {}", config.crawler.max_redirects);

    println!("\nDeny Patterns ({}):", settings.deny_patterns.len());
    for pattern in &settings.deny_patterns {
        println!("  - {}", pattern);
    }

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  JSON: {}", config.output.json_path);
    println!("  Filtered JSON: {}", config.output.filtered_path);
    if let Some(db) = &config.output.database_path {
        println!("  Database: {}", db);
    }
    if let Some(summary) = &config.output.summary_path {
        println!("  Summary: {}", summary);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let path = database_path(config)?;
    println!("Database: {}\n", path.display());

    let storage = SqliteStorage::new(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;

    let Some(run) = storage.get_latest_run()? else {
        println!("No crawl runs recorded yet.");
        return Ok(());
    };

    let stats = load_statistics(&storage, run.id)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: generates markdown summary
fn handle_export_summary(config: &Config) -> anyhow::Result<()> {
    let path = database_path(config)?;
    let summary_path = config
        .output
        .summary_path
        .clone()
        .unwrap_or_else(|| "summary.md".to_string());

    println!("=== Exporting Crawl Summary ===\n");
    println!("Database: {}", path.display());
    println!("Output: {}", summary_path);
    println!();

    let storage = SqliteStorage::new(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;

    tracing::info!("Loading crawl data from database...");
    let summary = generate_summary(&storage)?;

    tracing::info!("Generating markdown summary...");
    generate_markdown_summary(&summary, Path::new(&summary_path))
        .with_context(|| format!("Failed to write {}", summary_path))?;

    println!("✓ Summary exported to: {}", summary_path);

    Ok(())
}

/// Handles --clean and --clean-only: filters contact links out of the JSON output
fn handle_clean(config: &Config) -> anyhow::Result<()> {
    let input = Path::new(&config.output.json_path);
    let output = Path::new(&config.output.filtered_path);

    let (kept, removed) = clean_file(input, output)
        .with_context(|| format!("Failed to filter {}", input.display()))?;

    println!(
        "Filtered data saved to {} ({} kept, {} removed)",
        output.display(),
        kept,
        removed
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    let seed_url = config.crawler.seed_url.clone();

    let mut emitter =
        RecordEmitter::new().with_handler(Box::new(JsonOutputHandler::new(&config.output.json_path)));

    let mut run_id = None;
    if let Some(db) = &config.output.database_path {
        let storage = SqliteStorage::new(Path::new(db))
            .with_context(|| format!("Failed to open database {}", db))?;
        let storage: SharedStorage = Arc::new(Mutex::new(storage));
        let handler = SqliteOutputHandler::start(storage, &seed_url, config_hash)?;
        run_id = Some(handler.run_id());
        emitter.add_handler(Box::new(handler));
    }

    // Ctrl-C stops dispatching; in-flight fetches drain and sinks still flush
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight requests");
            signal_token.cancel();
        }
    });

    let coordinator = Coordinator::from_config(config)?;
    let report = coordinator.run(cancel, emitter).await?;

    println!();
    print_run_stats(&report.stats);
    println!("\nRun {} in {:.1}s", report.status, report.elapsed.as_secs_f64());

    if let Some(summary_path) = &config.output.summary_path {
        let mut summary =
            CrawlSummary::from_run(&seed_url, report.status, &report.stats, &report.records);
        summary.run_id = run_id;
        summary.config_hash = Some(config_hash.to_string());
        summary.duration_seconds = Some(report.elapsed.as_secs());

        generate_markdown_summary(&summary, Path::new(summary_path))
            .with_context(|| format!("Failed to write {}", summary_path))?;
        tracing::info!("Summary written to {}", summary_path);
    }

    Ok(())
}
