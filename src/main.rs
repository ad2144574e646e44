//! # wirefeed
//!
//! Two small, independent tools behind one binary:
//!
//! - **fetch**: call a news API once, normalize its JSON into a fixed
//!   RSSGuard-compatible feed, and print a summary or save the feed
//! - **report**: paste a list of heading/markup/script sections into a fixed
//!   HTML page and write it to disk
//!
//! ## Usage
//!
//! ```sh
//! wirefeed fetch --step bloomberg.yaml --output feeds/bloomberg.json
//! wirefeed report --title "Morning Brief" --sections sections.yaml
//! ```
//!
//! ## Architecture
//!
//! Each command is a single pass with no shared state:
//! 1. **fetch**: [`api`] performs the GET, [`normalizer`] maps the items,
//!    [`pipeline`] adapts the step description, [`outputs::json`] saves it
//! 2. **report**: [`config`] loads the sections, [`outputs::html`] renders
//!    and writes the page

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod models;
mod normalizer;
mod outputs;
mod pipeline;
mod utils;

use api::ReqwestFetcher;
use cli::{Cli, Command, FetchArgs, ReportArgs};
use models::{Feed, FetchConfig, ParamValue, PipelineStep};
use normalizer::SystemClock;
use outputs::{html, json};
use utils::TOKEN_PARAM;

/// Number of items echoed by the fetch summary.
const SUMMARY_ITEMS: usize = 3;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();

    let result = match args.command {
        Command::Fetch(fetch_args) => run_fetch(fetch_args).await,
        Command::Report(report_args) => run_report(report_args).await,
    };

    let elapsed = start_time.elapsed();
    match &result {
        Ok(()) => info!(?elapsed, "Execution complete"),
        Err(e) => error!(?elapsed, error = %e, "Execution failed"),
    }
    result
}

/// Build the step to run from either a step file or the command-line flags.
async fn resolve_step(args: &FetchArgs) -> Result<PipelineStep, Box<dyn Error>> {
    let mut step = match &args.step {
        Some(path) => config::load_step(path).await?,
        None => PipelineStep {
            plugin: None,
            config: FetchConfig {
                url: args.url.clone(),
                query_params: args
                    .params
                    .iter()
                    .map(|(k, v)| (k.clone(), ParamValue::Text(v.clone())))
                    .collect(),
            },
            output: "feed".to_string(),
        },
    };

    if let Some(token) = &args.token {
        step.config
            .query_params
            .insert(TOKEN_PARAM.to_string(), ParamValue::Text(token.clone()));
    }
    Ok(step)
}

fn build_fetcher(timeout_secs: Option<u64>) -> Result<ReqwestFetcher, Box<dyn Error>> {
    let Some(secs) = timeout_secs else {
        return Ok(ReqwestFetcher::new());
    };
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(secs))
        .build()?;
    Ok(ReqwestFetcher::with_client(client))
}

#[instrument(level = "info", skip_all)]
async fn run_fetch(args: FetchArgs) -> Result<(), Box<dyn Error>> {
    let step = resolve_step(&args).await?;
    let fetcher = build_fetcher(args.timeout_secs)?;
    info!(output = %step.output, url = %step.config.url, "Running fetch step");

    let produced = pipeline::run_step(&fetcher, &SystemClock, &step).await?;

    for (key, feed) in &produced {
        match &args.output {
            Some(path) => {
                json::write_feed(feed, path).await?;
                println!("Feed `{key}` written to {}", path.display());
            }
            None => print_summary(feed),
        }
    }
    Ok(())
}

fn print_summary(feed: &Feed) {
    println!("Feed Title: {}", feed.title);
    println!("Number of items: {}", feed.items.len());

    for item in feed.items.iter().take(SUMMARY_ITEMS) {
        println!("\nTitle: {}", item.title);
        println!("Link: {}", item.link);
        println!("Author: {}", item.author);
        if !item.tickers.is_empty() {
            println!("Tickers: {}", item.tickers.join(", "));
        }
    }
}

#[instrument(level = "info", skip_all, fields(title = %args.title))]
async fn run_report(args: ReportArgs) -> Result<(), Box<dyn Error>> {
    let sections = config::load_sections(&args.sections).await?;
    info!(count = sections.len(), "Assembling report");

    let path = html::assemble(&args.title, &sections, &args.output_dir, &args.filename).await?;
    println!("Report generated: {}", path.display());
    Ok(())
}
