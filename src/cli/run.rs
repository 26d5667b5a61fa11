//! Run command implementation.

use crate::cli::{CliError, SOLVED_THRESHOLD};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use symreg::gp::{checkpoint_path, save_checkpoint};
use symreg::{Engine, EngineConfig, Problem};

/// Execute the run command.
#[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
pub(crate) fn execute(
    problem: PathBuf,
    generations: u32,
    population: usize,
    capacity: usize,
    mutation: f64,
    crossover: f64,
    tournament: usize,
    seed: Option<u64>,
    precision: usize,
    output: Option<PathBuf>,
    checkpoint_interval: u32,
    progress: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let problem = Problem::from_file(&problem)?;
    let config = EngineConfig {
        population_size: population,
        program_capacity: capacity,
        node_mutation_prob: mutation,
        crossover_prob: crossover,
        tournament_size: tournament,
        seed: seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(42)
        }),
    };

    if !quiet {
        println!("Starting run:");
        println!("  Population: {population}");
        println!("  Generations: {generations}");
        println!("  Seed: {}", config.seed);
        println!();
    }

    let mut engine = Engine::new(&problem, config)?;
    drive(
        &mut engine,
        generations,
        precision,
        output,
        checkpoint_interval,
        progress,
        quiet,
    )
}

/// Run the generation loop on an engine, fresh or resumed.
#[allow(clippy::fn_params_excessive_bools)]
pub(crate) fn drive(
    engine: &mut Engine,
    generations: u32,
    precision: usize,
    output: Option<PathBuf>,
    checkpoint_interval: u32,
    progress: bool,
    quiet: bool,
) -> Result<(), CliError> {
    if let Some(dir) = &output {
        fs::create_dir_all(dir)?;
    }

    let pb = if progress {
        let pb = ProgressBar::new(u64::from(generations));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} generations")
                .map_err(|e| CliError::new(e.to_string()))?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let target = engine.generation() + generations;
    let mut solved = engine.fitness_of(engine.best()) > SOLVED_THRESHOLD;

    if reports_initial_stats(engine.generation()) {
        report(engine, quiet, pb.as_ref());
    }
    while !solved && engine.generation() < target {
        engine.evolve();
        report(engine, quiet, pb.as_ref());
        if let Some(pb) = &pb {
            pb.inc(1);
        }

        if let Some(dir) = &output
            && checkpoint_interval > 0
            && engine.generation() % checkpoint_interval == 0
        {
            save_checkpoint(&engine.checkpoint(), &checkpoint_path(dir, engine.generation()))?;
        }

        solved = engine.fitness_of(engine.best()) > SOLVED_THRESHOLD;
    }

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }
    if let Some(dir) = &output {
        save_checkpoint(&engine.checkpoint(), &checkpoint_path(dir, engine.generation()))?;
    }

    let best = engine.best();
    println!();
    if solved {
        println!("Solution found at generation {}.", engine.generation());
    } else {
        println!("Generation budget exhausted.");
    }
    println!("  Best fitness: {:.6}", engine.fitness_of(best));
    println!("  Best length: {}", engine.len_of(best));
    println!("  Elapsed time: {:.1}s", start.elapsed().as_secs_f64());
    println!();
    println!("Best program:");
    println!("  {}", engine.render(best, precision));

    Ok(())
}

/// Whether the pre-loop stats line should print. A resumed run's starting
/// generation was already reported by the run that saved the checkpoint.
fn reports_initial_stats(generation: u32) -> bool {
    generation == 0
}

fn report(engine: &Engine, quiet: bool, pb: Option<&ProgressBar>) {
    if quiet {
        return;
    }
    let stats = engine.stats();
    let line = format!(
        "gen {:>5} | best {:>12.6} | mean {:>12.6} | len {:>6.1}",
        engine.generation(),
        stats.best_fitness,
        stats.mean_fitness,
        stats.mean_len,
    );
    match pb {
        Some(pb) => pb.println(line),
        None => println!("{line}"),
    }
}
