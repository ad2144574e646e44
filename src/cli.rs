//! Command-line interface definitions for wirefeed.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Endpoint, token and output directory can also come from environment
//! variables.

use crate::models::DEFAULT_API_URL;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for wirefeed.
///
/// # Examples
///
/// ```sh
/// # Fetch the default feed and print a summary
/// wirefeed fetch --param ageHours=120 --param tickers=NTRS:US --token "$FEED_API_TOKEN"
///
/// # Run a pipeline step file and save the feed
/// wirefeed fetch --step bloomberg.yaml --output feeds/bloomberg.json
///
/// # Build a report from a sections file
/// wirefeed report --title "Morning Brief" --sections sections.yaml -o reports
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch the news API once and normalize the response into a feed
    Fetch(FetchArgs),
    /// Assemble report sections into a static HTML page
    Report(ReportArgs),
}

#[derive(clap::Args, Debug)]
pub struct FetchArgs {
    /// Pipeline step file (YAML or JSON); overrides --url and --param
    #[arg(short, long)]
    pub step: Option<PathBuf>,

    /// Feed API endpoint
    #[arg(long, env = "FEED_API_URL", default_value = DEFAULT_API_URL)]
    pub url: String,

    /// Query parameter as KEY=VALUE; repeatable
    #[arg(short, long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Opaque API token, sent as the `token` query parameter
    #[arg(long, env = "FEED_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Request timeout in seconds (no timeout when omitted)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Write the feed as JSON to this file instead of printing a summary
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Report title, used for <title> and the top heading
    #[arg(short, long)]
    pub title: String,

    /// Sections file (YAML or JSON list of heading/text/script)
    #[arg(short, long)]
    pub sections: PathBuf,

    /// Output directory for the report
    #[arg(short, long, env = "REPORT_OUTPUT_DIR", default_value = "reports")]
    pub output_dir: PathBuf,

    /// Report file name
    #[arg(short, long, default_value = "report.html")]
    pub filename: String,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{s}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_fetch_parsing() {
        let cli = Cli::parse_from([
            "wirefeed",
            "fetch",
            "--url",
            "https://feeds.example.com/news.json",
            "--param",
            "ageHours=120",
            "-p",
            "tickers=NTRS:US",
            "--token",
            "secret",
            "--output",
            "feed.json",
        ]);

        let Command::Fetch(args) = cli.command else {
            panic!("expected fetch subcommand");
        };
        assert_eq!(args.url, "https://feeds.example.com/news.json");
        assert_eq!(
            args.params,
            vec![
                ("ageHours".to_string(), "120".to_string()),
                ("tickers".to_string(), "NTRS:US".to_string()),
            ]
        );
        assert_eq!(args.token.as_deref(), Some("secret"));
        assert_eq!(args.output, Some(PathBuf::from("feed.json")));
        assert_eq!(args.step, None);
    }

    #[test]
    fn test_cli_report_short_flags_and_defaults() {
        let cli = Cli::parse_from([
            "wirefeed",
            "report",
            "-t",
            "Morning Brief",
            "-s",
            "sections.yaml",
            "-o",
            "/tmp/reports",
        ]);

        let Command::Report(args) = cli.command else {
            panic!("expected report subcommand");
        };
        assert_eq!(args.title, "Morning Brief");
        assert_eq!(args.sections, PathBuf::from("sections.yaml"));
        assert_eq!(args.output_dir, PathBuf::from("/tmp/reports"));
        assert_eq!(args.filename, "report.html");
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("token=a=b").unwrap(),
            ("token".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_cli_rejects_malformed_param() {
        let result = Cli::try_parse_from(["wirefeed", "fetch", "--param", "ageHours"]);
        assert!(result.is_err());
    }
}
