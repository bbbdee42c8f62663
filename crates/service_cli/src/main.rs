//! Reliability CLI - Command Line Runner for the Reliability Engine
//!
//! This is the operational entry point of the structural reliability
//! workspace.
//!
//! # Commands
//!
//! - `reliability run --config <file>` - Run a built-in limit state
//! - `reliability check` - Print the resolved configuration
//! - `reliability list` - List scenarios and methods
//!
//! # Configuration
//!
//! Settings come from an optional TOML file, then the environment
//! (`RELIABILITY_LOG_LEVEL`, `RELIABILITY_THREADS`, `RELIABILITY_SEED`),
//! then the command line flags.

use clap::{Parser, Subcommand};
use reliability_methods::MethodKind;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod scenarios;

pub use error::{CliError, Result};

use config::OutputFormat;
use scenarios::Scenario;

/// Structural reliability engine CLI
#[derive(Parser)]
#[command(name = "reliability")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a built-in limit state
    Run {
        /// Scenario (linear-resistance, parallel-system, oblate-spheroid, noisy-sphere)
        #[arg(short, long)]
        scenario: Option<Scenario>,

        /// Method (form, ds, cm, is, ni)
        #[arg(short, long)]
        method: Option<MethodKind>,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Seed of the sampling methods
        #[arg(long)]
        seed: Option<u64>,

        /// Worker threads for batched evaluations
        #[arg(short, long)]
        threads: Option<usize>,
    },

    /// Check system configuration
    Check,

    /// List scenarios and methods
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        if !path.exists() {
            return Err(CliError::FileNotFound(path.display().to_string()));
        }
    }
    let config = config::build_config(cli.config.as_deref())?;

    // Initialise tracing; RUST_LOG wins over the configured level
    let level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_filter_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Run {
            scenario,
            method,
            format,
            seed,
            threads,
        } => {
            let options = commands::run::RunOptions {
                scenario,
                method,
                format,
                seed,
                threads,
            };
            commands::run::run(config, &options)
        }
        Commands::Check => commands::check::run(&config),
        Commands::List => commands::list::run(),
    }
}
