//! ACS2 CLI - learn maze models and inspect saved populations.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

/// ACS2 - An anticipatory learning classifier system
#[derive(Parser, Debug)]
#[command(name = "acs2")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Learn in a built-in maze, then exploit the learned model
    Maze {
        /// Maze layout name (simple, medium)
        #[arg(short, long, default_value = "simple")]
        layout: String,

        /// Number of exploration trials
        #[arg(long, default_value = "50")]
        explore: usize,

        /// Number of exploitation trials
        #[arg(long, default_value = "10")]
        exploit: usize,

        /// Random seed (overrides the configuration file)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Exploration probability (overrides the configuration file)
        #[arg(short, long)]
        epsilon: Option<f64>,

        /// Enable the genetic generalization
        #[arg(long)]
        ga: bool,

        /// Enable probability-enhanced effects
        #[arg(long)]
        pee: bool,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Save the learned population (`.json` for JSON, binary otherwise)
        #[arg(long)]
        save: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Print a saved population
    Inspect {
        /// Snapshot file
        #[arg(required = true)]
        snapshot: PathBuf,

        /// Only show reliable classifiers
        #[arg(short, long)]
        reliable: bool,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Commands::Maze {
            layout,
            explore,
            exploit,
            seed,
            epsilon,
            ga,
            pee,
            config,
            save,
            format,
            progress,
        } => cli::maze::execute(&cli::maze::MazeArgs {
            layout,
            explore,
            exploit,
            seed,
            epsilon,
            ga,
            pee,
            config,
            save,
            format,
            progress,
        }),

        Commands::Inspect {
            snapshot,
            reliable,
            format,
        } => cli::inspect::execute(&snapshot, reliable, format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
