//! Resume command implementation.

use crate::cli::CliError;
use std::path::PathBuf;
use symreg::gp::load_checkpoint;
use symreg::{Engine, Problem};

/// Execute the resume command.
#[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
pub(crate) fn execute(
    checkpoint: PathBuf,
    problem: PathBuf,
    generations: u32,
    precision: usize,
    output: Option<PathBuf>,
    checkpoint_interval: u32,
    progress: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let problem = Problem::from_file(&problem)?;
    let checkpoint = load_checkpoint(&checkpoint)?;

    if !quiet {
        println!("Resuming from generation {}.", checkpoint.generation);
        println!();
    }

    let mut engine = Engine::from_checkpoint(&problem, checkpoint)?;
    crate::cli::run::drive(
        &mut engine,
        generations,
        precision,
        output,
        checkpoint_interval,
        progress,
        quiet,
    )
}
