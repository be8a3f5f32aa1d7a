//! CLI command definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// custom-cf - CloudFormation custom resource providers
#[derive(Parser, Debug)]
#[command(name = "custom-cf")]
#[command(version)]
#[command(about = "Inspect custom resource requests and answer them by hand")]
#[command(
    long_about = "custom-cf checks a custom resource request the way its provider would and can deliver a status for a stack whose provider never answered."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a request's kind, validate it and print the physical id
    Inspect {
        /// Request JSON file
        #[arg(short, long, env = "CUSTOM_CF_EVENT")]
        event: PathBuf,
    },

    /// Deliver a status envelope for a request
    Respond(RespondArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RespondArgs {
    /// Request JSON file
    #[arg(short, long, env = "CUSTOM_CF_EVENT")]
    pub event: PathBuf,

    /// Status to report
    #[arg(short, long, value_enum)]
    pub status: StatusArg,

    /// Reason shown in the stack events, failed only
    #[arg(short, long)]
    pub reason: Option<String>,

    /// Physical id to report instead of the derived one
    #[arg(short, long)]
    pub physical_id: Option<String>,

    /// Delivery settings file (JSON or TOML)
    #[arg(short, long, env = "CUSTOM_CF_DELIVERY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the envelope without sending it
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusArg {
    Success,
    Failed,
}
