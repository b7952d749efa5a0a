//! Sextant CLI - Call-graph extraction from the command line.
//!
//! Sextant analyzes a type-checked program model produced by a language
//! front end and loads the resulting code graph into `SQLite`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

/// Sextant: type-resolved call graph extraction.
#[derive(Parser)]
#[command(name = "sextant")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Graph database file
    #[arg(short, long, global = true, default_value = ".sextant/graph.db")]
    db: PathBuf,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a program model and load the graph
    Analyze {
        /// Program model JSON produced by a language front end
        program: PathBuf,

        /// Project import-path prefix; packages outside it are third-party
        #[arg(short, long)]
        project: String,

        /// Remove existing graph contents before loading
        #[arg(long)]
        clean: bool,

        /// Also write the analysis as JSON to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Show graph statistics
    Stats,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    // Run the appropriate command
    let result = match cli.command {
        Commands::Analyze {
            program,
            project,
            clean,
            export,
        } => cli::analyze::run(&program, &project, &cli.db, clean, export.as_deref()),
        Commands::Stats => cli::stats::run(&cli.db),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}
