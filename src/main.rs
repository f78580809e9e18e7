//! Hostwalk main entry point
//!
//! This is the command-line interface for the Hostwalk latency crawler.

use clap::Parser;
use hostwalk::config::{compute_config_hash, parse_config, validate, Config, SeedEntry};
use hostwalk::crawler::run_crawl;
use hostwalk::output::print_summary;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Hostwalk: a breadth-first host latency crawler
///
/// Hostwalk fetches pages over raw TCP, follows absolute links to hosts it
/// has not seen yet, and writes how long each host took to answer.
#[derive(Parser, Debug)]
#[command(name = "hostwalk")]
#[command(version)]
#[command(about = "A breadth-first host latency crawler", long_about = None)]
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

    /// Override the page budget from the config file
    #[arg(long, value_name = "N")]
    page_budget: Option<u32>,

    /// Override the report path from the config file
    #[arg(long, value_name = "PATH")]
    report: Option<String>,

    /// Replace the configured seeds (repeatable)
    #[arg(long = "seed", value_name = "URL")]
    seeds: Vec<String>,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(budget) = self.page_budget {
            config.crawler.page_budget = budget;
        }
        if let Some(report) = &self.report {
            config.output.report_path = report.clone();
        }
        if !self.seeds.is_empty() {
            config.seeds = self
                .seeds
                .iter()
                .map(|url| SeedEntry { url: url.clone() })
                .collect();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match parse_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Overrides must pass the same checks as the file values
    cli.apply_overrides(&mut config);
    if let Err(e) = validate(&config) {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    let hash = compute_config_hash(&cli.config)?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("hostwalk=info,warn"),
            1 => EnvFilter::new("hostwalk=debug,info"),
            2 => EnvFilter::new("hostwalk=trace,debug"),
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
    println!("=== Hostwalk Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Page budget: {}", config.crawler.page_budget);
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!(
        "  Politeness delay: {}ms",
        config.crawler.politeness_delay_ms
    );
    println!("  Dedup key: {:?}", config.crawler.dedup_key);

    println!("\nFetcher:");
    println!("  Default port: {}", config.fetcher.port);
    println!(
        "  Receive buffer: {} bytes",
        config.fetcher.receive_buffer_size
    );
    println!("  Connect timeout: {}ms", config.fetcher.connect_timeout_ms);
    println!("  Read timeout: {}ms", config.fetcher.read_timeout_ms);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Report: {}", config.output.report_path);
    println!("  Host column width: {}", config.output.host_column_width);
    match &config.output.pages_dir {
        Some(dir) => println!("  Pages: {}", dir),
        None => println!("  Pages: not saved"),
    }

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - {}", seed.url);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Crawling from {} seeds with a budget of {} pages",
        config.seeds.len(),
        config.crawler.page_budget
    );

    match run_crawl(config).await {
        Ok(outcome) => {
            tracing::info!("Crawl completed successfully");
            print_summary(&outcome.summary);
            println!("\nReport written to: {}", config.output.report_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
