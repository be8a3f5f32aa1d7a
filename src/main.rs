//! # custom-cf
//!
//! Operator entry point for the custom resource providers.
//!
//! - `inspect` parses a request, resolves its kind and validates it exactly
//!   as the provider would, without calling any backend
//! - `respond` delivers a status envelope by hand, for a stack stuck waiting
//!   on a provider that died before answering
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default `info`). Command output
//! goes to stdout as JSON.

#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![forbid(clippy::panic)]
#![deny(clippy::expect_used)]

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use custom_cf::cli::{Cli, Commands};
use custom_cf::commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing();

    match cli.command {
        Commands::Inspect { event } => {
            let request = commands::load_request(&event)?;
            let inspection = commands::inspect(&request)?;
            print_json(&inspection)?;
        }
        Commands::Respond(args) => {
            let envelope = commands::respond(&args).await?;
            if args.dry_run {
                info!("Dry run, nothing sent");
            }
            print_json(&envelope)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
