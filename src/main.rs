//! `pco-history` - look up a person's recent `Planning Center` activity.
//!
//! Usage:
//!   pco-history <person-id>     print the consolidated lookup as JSON
//!   pco-history --raw <url>     print one raw upstream document

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pco_history::config::Config;
use pco_history::lookup::PersonLookup;
use pco_history::types::PersonId;

const USAGE: &str = "usage: pco-history <person-id> | pco-history --raw <url>";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !matches!(args.as_slice(), [_] | [_, _]) || args.first().is_some_and(|a| a == "--help" || a == "-h") {
        eprintln!("{USAGE}");
        return Ok(ExitCode::from(2));
    }

    // Credentials are checked before any lookup is attempted
    let config = Config::load().context("Failed to load configuration")?;
    config.require_credentials()?;
    info!(app = config.app_name(), version = config.app_version(), "Starting");

    let lookup = PersonLookup::from_config(&config)?;

    let output: Value = match args.as_slice() {
        [flag, url] if flag == "--raw" => lookup
            .fetcher()
            .proxy(url)
            .await
            .with_context(|| format!("Failed to fetch {url}"))?,
        [id] => {
            let person_id = PersonId::parse(id)?;
            let result = lookup.lookup(&person_id).await?;
            serde_json::to_value(result).context("Failed to serialize lookup result")?
        }
        _ => {
            eprintln!("{USAGE}");
            return Ok(ExitCode::from(2));
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(ExitCode::SUCCESS)
}
