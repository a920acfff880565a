//! Covey CLI — the main entry point.
//!
//! Commands:
//! - `ask`    — Run one question through the multi-agent workflow
//! - `agents` — Show the configured sub-agent roster
//! - `doctor` — Diagnose configuration and provider reachability

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "covey",
    about = "Covey — a multi-agent question-answering runtime",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the agent team a question
    Ask {
        /// The question to answer
        question: String,

        /// A file the question refers to (image, audio, data)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Write the run's audit trail to this JSON file
        #[arg(long)]
        audit: Option<PathBuf>,
    },

    /// Show the configured sub-agent roster
    Agents,

    /// Diagnose configuration and provider health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Ask {
            question,
            file,
            audit,
        } => commands::ask::run(question, file, audit).await?,
        Commands::Agents => commands::agents::run()?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
