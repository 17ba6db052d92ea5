//! tweet-purge - Delete every tweet older than a cutoff date

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use libtweetpurge::api::http::HttpTimelineApi;
use libtweetpurge::logging::{self, LogFormat};
use libtweetpurge::rate_limiter::TokioCooldown;
use libtweetpurge::{Config, PurgeError, PurgeOptions, PurgeSummary, Purger};

#[derive(Parser, Debug)]
#[command(name = "tweet-purge")]
#[command(version, about = "Delete all of your tweets created before a cutoff date")]
#[command(long_about = r#"Delete all of your tweets created before a cutoff date.

The whole timeline is fetched first; nothing is deleted unless every page
was listed successfully. Deletes are limited to 50 per 15 minutes, so large
purges pause between batches.

CREDENTIALS (environment):
    BEARER_TOKEN                     App-only token, used to list tweets
    CONSUMER_KEY, CONSUMER_SECRET    OAuth 1.0a consumer (API) key pair
    ACCESS_TOKEN, ACCESS_SECRET      OAuth 1.0a user access token pair

CONFIGURATION:
    $TWEETPURGE_CONFIG or ~/.config/tweet-purge/config.toml (optional)

    [api]
    base_url = "https://api.twitter.com"
    timeout_secs = 30

    [purge]
    cutoff = "2015-07-01T00:00:00Z"

EXAMPLES:
    # See what would go, without deleting anything
    tweet-purge --before 2019-01-01 --dry-run

    # Delete everything before the configured cutoff
    tweet-purge

    # Machine-readable summary
    tweet-purge --format json | jq '.deleted'

EXIT CODES:
    0 - Run completed (individual delete failures are reported, not fatal)
    1 - Fatal error (configuration, listing, malformed response)
    2 - Could not resolve the authenticated account
    3 - Invalid input
"#)]
struct Cli {
    /// Delete tweets created before this date (YYYY-MM-DD or RFC 3339, overrides config)
    #[arg(short, long, value_name = "DATE")]
    before: Option<String>,

    /// List what would be deleted without deleting
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Output format for the final summary
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Log format on stderr
    #[arg(long, env = "TWEETPURGE_LOG_FORMAT", default_value = "text", value_name = "FORMAT")]
    log_format: LogFormat,

    /// Path to config file (overrides $TWEETPURGE_CONFIG)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_format, cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e.downcast_ref::<PurgeError>().map_or(1, PurgeError::exit_code);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let before = cli.before.as_deref().map(parse_cutoff).transpose()?;

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    let cutoff = before.unwrap_or(config.purge.cutoff);

    tracing::debug!(cutoff = %cutoff, dry_run = cli.dry_run, "tweet-purge starting");

    let api = HttpTimelineApi::from_config(&config)?;
    let mut options = PurgeOptions::new(cutoff);
    options.dry_run = cli.dry_run;

    let purger = Purger::new(Box::new(api), Box::new(TokioCooldown::default()), options);
    let summary = purger.run().await?;

    match cli.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => print_text_summary(&summary),
    }

    Ok(())
}

/// Accepts `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp
fn parse_cutoff(date_str: &str) -> std::result::Result<DateTime<Utc>, PurgeError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| {
            PurgeError::InvalidInput(format!(
                "Invalid date: {}. Use YYYY-MM-DD or RFC 3339 (YYYY-MM-DDTHH:MM:SSZ)",
                date_str
            ))
        })
}

fn print_text_summary(summary: &PurgeSummary) {
    println!(
        "Current user: @{} (id {})",
        summary.account.username, summary.account.id
    );
    println!(
        "Fetched {} tweets: {} before {}, {} kept",
        summary.fetched,
        summary.selected,
        summary.cutoff.to_rfc3339(),
        summary.kept
    );

    if summary.dry_run {
        println!("Dry run: would delete {} tweets", summary.selected);
        for id in &summary.would_delete {
            println!("  {}", id);
        }
        return;
    }

    for failure in &summary.failures {
        println!("  [ERROR] {}", failure);
    }
    println!(
        "Successfully deleted {} tweets, with {} errors",
        summary.deleted, summary.errored
    );
    println!("Done!");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_cutoff_date_only() {
        assert_eq!(
            parse_cutoff("2015-07-01").unwrap(),
            Utc.with_ymd_and_hms(2015, 7, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_cutoff_rfc3339_with_offset() {
        assert_eq!(
            parse_cutoff("2015-07-01T02:00:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2015, 7, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_cutoff_invalid() {
        let err = parse_cutoff("July 1st").unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("July 1st"));
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "tweet-purge",
            "--before",
            "2019-01-01",
            "--dry-run",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.before.as_deref(), Some("2019-01-01"));
        assert!(cli.dry_run);
        assert_eq!(cli.format, "json");
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["tweet-purge", "--format", "csv"]).is_err());
    }
}
