//! Symreg CLI - Command-line interface for symbolic-regression runs.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

/// Symreg - A deterministic symbolic-regression engine
#[derive(Parser, Debug)]
#[command(name = "symreg")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run evolution on a problem file
    Run {
        /// Problem file (whitespace-token example table)
        #[arg(required = true)]
        problem: std::path::PathBuf,

        /// Number of generations (default: 100)
        #[arg(short, long, default_value = "100")]
        generations: u32,

        /// Population size (default: 10000)
        #[arg(short, long, default_value = "10000")]
        population: usize,

        /// Program buffer capacity in bytes (default: 100)
        #[arg(long, default_value = "100")]
        capacity: usize,

        /// Per-node mutation probability (default: 0.05)
        #[arg(short, long, default_value = "0.05")]
        mutation: f64,

        /// Crossover probability (default: 0.9)
        #[arg(short, long, default_value = "0.9")]
        crossover: f64,

        /// Tournament size (default: 2)
        #[arg(short, long, default_value = "2")]
        tournament: usize,

        /// Random seed (default: current time)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Fractional digits when rendering constants (default: 2)
        #[arg(long, default_value = "2")]
        precision: usize,

        /// Directory for checkpoint files
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,

        /// Generations between checkpoints (default: 10; 0 disables)
        #[arg(long, default_value = "10")]
        checkpoint_interval: u32,

        /// Show progress bar
        #[arg(long)]
        progress: bool,

        /// Suppress per-generation output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Resume evolution from a checkpoint
    Resume {
        /// Checkpoint file (.json)
        #[arg(required = true)]
        checkpoint: std::path::PathBuf,

        /// Problem file the checkpoint was created from
        #[arg(required = true)]
        problem: std::path::PathBuf,

        /// Additional generations to run (default: 100)
        #[arg(short, long, default_value = "100")]
        generations: u32,

        /// Fractional digits when rendering constants (default: 2)
        #[arg(long, default_value = "2")]
        precision: usize,

        /// Directory for checkpoint files
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,

        /// Generations between checkpoints (default: 10; 0 disables)
        #[arg(long, default_value = "10")]
        checkpoint_interval: u32,

        /// Show progress bar
        #[arg(long)]
        progress: bool,

        /// Suppress per-generation output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Inspect a checkpoint file
    Inspect {
        /// Checkpoint file (.json)
        #[arg(required = true)]
        checkpoint: std::path::PathBuf,

        /// Problem file the checkpoint was created from
        #[arg(required = true)]
        problem: std::path::PathBuf,

        /// Fractional digits when rendering constants (default: 2)
        #[arg(long, default_value = "2")]
        precision: usize,

        /// Number of top programs to show (default: 5)
        #[arg(long, default_value = "5")]
        top: usize,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let result = match args.command {
        Commands::Run {
            problem,
            generations,
            population,
            capacity,
            mutation,
            crossover,
            tournament,
            seed,
            precision,
            output,
            checkpoint_interval,
            progress,
            quiet,
        } => cli::run::execute(
            problem,
            generations,
            population,
            capacity,
            mutation,
            crossover,
            tournament,
            seed,
            precision,
            output,
            checkpoint_interval,
            progress,
            quiet,
        ),

        Commands::Resume {
            checkpoint,
            problem,
            generations,
            precision,
            output,
            checkpoint_interval,
            progress,
            quiet,
        } => cli::resume::execute(
            checkpoint,
            problem,
            generations,
            precision,
            output,
            checkpoint_interval,
            progress,
            quiet,
        ),

        Commands::Inspect {
            checkpoint,
            problem,
            precision,
            top,
        } => cli::inspect::execute(checkpoint, problem, precision, top),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
