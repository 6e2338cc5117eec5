//! Capgate CLI - run the authorizer and the capability evaluator from a shell.
//!
//! Logs go to stderr so that decisions printed on stdout can be piped.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{authorize, check, config};

/// Capgate - capability-aware bearer token authorizer
#[derive(Parser)]
#[command(name = "capgate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CAPGATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer one gateway authorizer event
    Authorize {
        /// Event file (reads stdin when omitted)
        #[arg(short, long)]
        event: Option<PathBuf>,
    },

    /// Evaluate a capability against a propagated context string
    Check {
        /// The propagated `unsafeMetadata` context (JSON)
        #[arg(long)]
        context: String,

        /// Capability name
        #[arg(long)]
        capability: String,

        /// Evaluation instant, RFC 3339 (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Print the resolved configuration
    Config,
}

fn init_logging(config: Option<&capgate_config::Config>, verbose: bool) {
    let log_config = match config.map(|cfg| capgate_telemetry::LogConfig::try_from(&cfg.logging)) {
        Some(Ok(mut lc)) => {
            if verbose {
                "debug".clone_into(&mut lc.level);
            }
            lc
        },
        Some(Err(e)) => {
            eprintln!("Invalid logging configuration: {e}");
            fallback_log_config(verbose)
        },
        None => fallback_log_config(verbose),
    };

    if let Err(e) = capgate_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }
}

fn fallback_log_config(verbose: bool) -> capgate_telemetry::LogConfig {
    let level = if verbose { "debug" } else { "warn" };
    capgate_telemetry::LogConfig::new(level).with_format(capgate_telemetry::LogFormat::Compact)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Authorize { event } => {
            let cfg = capgate_config::Config::load(cli.config.as_deref())?;
            init_logging(Some(&cfg), cli.verbose);
            authorize::run_authorize(&cfg, event.as_deref()).await
        },
        Commands::Check {
            context,
            capability,
            at,
        } => {
            init_logging(None, cli.verbose);
            check::run_check(&context, &capability, at.as_deref())
        },
        Commands::Config => {
            let cfg = capgate_config::Config::load(cli.config.as_deref())?;
            init_logging(Some(&cfg), cli.verbose);
            config::show_config(&cfg)?;
            Ok(ExitCode::SUCCESS)
        },
    }
}
