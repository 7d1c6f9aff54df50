//! Pagesift main entry point
//!
//! This is the command-line interface for the Pagesift page fact extractor.

use anyhow::Context;
use clap::Parser;
use pagesift::config::{load_config, Config};
use pagesift::scrape::CacheStatsBody;
use pagesift::{spawn_sweeper, ScrapePipeline};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Pagesift: a guarded single-page fact extractor
///
/// Pagesift fetches each URL behind an SSRF admission gate and prints a JSON
/// fact sheet: title, metadata, headings, paragraphs, links, images and
/// word statistics. Repeated URLs are served from an in-memory cache.
#[derive(Parser, Debug)]
#[command(name = "pagesift")]
#[command(version = "1.0.0")]
#[command(about = "A guarded single-page fact extractor", long_about = None)]
struct Cli {
    /// URLs to scrape, in order
    #[arg(value_name = "URL", required = true)]
    urls: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Print cache statistics after all URLs are processed
    #[arg(long)]
    cache_stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    let pipeline = ScrapePipeline::from_config(&config).context("Failed to build HTTP client")?;
    let sweeper = spawn_sweeper(pipeline.cache(), config.cache.check_period());
    tracing::debug!(
        "Cache TTL {}s, sweeping every {}s",
        pipeline.cache().ttl().as_secs(),
        config.cache.check_period().as_secs()
    );

    let mut failures = 0usize;
    for candidate in &cli.urls {
        match pipeline.scrape(candidate).await {
            Ok(response) => println!("{}", to_json(&response, cli.pretty)?),
            Err(e) => {
                failures += 1;
                tracing::error!("Scrape failed for {}: {}", candidate, e);
                eprintln!("{} {}", e.status_code(), to_json(&e.error_body(), cli.pretty)?);
            }
        }
    }

    if cli.cache_stats {
        let stats = CacheStatsBody::from(pipeline.cache_stats());
        println!("{}", to_json(&stats, cli.pretty)?);
    }

    sweeper.abort();

    if failures > 0 {
        tracing::warn!("{} of {} URLs failed", failures, cli.urls.len());
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only JSON.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pagesift=info,warn"),
            1 => EnvFilter::new("pagesift=debug,info"),
            2 => EnvFilter::new("pagesift=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
