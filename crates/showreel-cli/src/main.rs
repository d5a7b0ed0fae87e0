//! Showreel CLI - Headless playback binding diagnostics
//!
//! Features:
//! - Capability probing: which strategy a given runtime would select
//! - Scenario replay: drive scripted fault sequences through the binding
//! - Tuning dump: the fixed engine configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

/// Showreel CLI - playback binding diagnostics
#[derive(Parser)]
#[command(name = "showreel-cli")]
#[command(author = "Showreel Media")]
#[command(version)]
#[command(about = "Adaptive playback binding diagnostics", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the capability probe and report the selected strategy
    Probe {
        /// Stream manifest URI
        source: String,

        /// The surface reports native adaptive-streaming support
        #[arg(long)]
        native: bool,

        /// No software engine available in the runtime
        #[arg(long)]
        no_engine: bool,
    },

    /// Replay a fault scenario through the binding and report the outcome
    Simulate {
        /// Stream manifest URI
        source: String,

        /// JSON scenario file; the built-in fault run is used when omitted
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// The surface reports native adaptive-streaming support
        #[arg(long)]
        native: bool,

        /// No software engine available in the runtime
        #[arg(long)]
        no_engine: bool,
    },

    /// Print the fixed engine tuning
    Tuning,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(level).init();

    match cli.command {
        Commands::Probe {
            source,
            native,
            no_engine,
        } => {
            commands::probe(&source, native, no_engine, &cli.format)?;
        }
        Commands::Simulate {
            source,
            scenario,
            native,
            no_engine,
        } => {
            commands::simulate(&source, scenario, native, no_engine, &cli.format).await?;
        }
        Commands::Tuning => {
            commands::tuning(&cli.format)?;
        }
    }

    Ok(())
}
