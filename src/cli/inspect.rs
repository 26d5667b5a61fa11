//! Inspect command implementation.

use crate::cli::CliError;
use std::path::PathBuf;
use symreg::gp::load_checkpoint;
use symreg::{Engine, Problem};

/// Execute the inspect command.
pub(crate) fn execute(
    checkpoint: PathBuf,
    problem: PathBuf,
    precision: usize,
    top: usize,
) -> Result<(), CliError> {
    let problem = Problem::from_file(&problem)?;
    let checkpoint = load_checkpoint(&checkpoint)?;
    let engine = Engine::from_checkpoint(&problem, checkpoint)?;

    let stats = engine.stats();
    println!("Generation: {}", engine.generation());
    println!("Population: {}", engine.population_size());
    println!("Constants: {:?}", engine.constants());
    println!("Best fitness: {:.6}", stats.best_fitness);
    println!("Mean fitness: {:.6}", stats.mean_fitness);
    println!("Mean length: {:.1}", stats.mean_len);
    println!();

    // Rank the population by fitness and show the strongest individuals.
    let mut ranked: Vec<usize> = (0..engine.population_size()).collect();
    ranked.sort_by(|&a, &b| {
        engine
            .fitness_of(b)
            .partial_cmp(&engine.fitness_of(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    println!("Top programs:");
    for &index in ranked.iter().take(top) {
        println!(
            "  [{index:>5}] fitness {:>12.6} len {:>4}  {}",
            engine.fitness_of(index),
            engine.len_of(index),
            engine.render(index, precision),
        );
    }

    Ok(())
}
