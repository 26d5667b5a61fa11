//! The steady-state evolution engine.
//!
//! [`Engine`] owns the entire run state: the immutable example table and
//! constant pool, the population of programs with its index-aligned fitness
//! array, a scratch buffer for crossover, and the single random stream. One
//! [`Engine::evolve`] call performs `population_size` replacement events in
//! place; a replacement made early in the pass is visible to every later
//! tournament in the same pass.

// Statistics aggregate usize lengths into f64 means.
#![allow(clippy::cast_precision_loss)]

use crate::gp::crossover::crossover;
use crate::gp::fitness::{fitness, score_population};
use crate::gp::mutation::mutate;
use crate::gp::persistence::Checkpoint;
use crate::gp::program::{Alphabet, Program, NUM_OPS};
use crate::gp::rng::Lcg48;
use crate::gp::selection::{negative_tournament, tournament};
use crate::problem::Problem;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parameters of one evolution run, validated by [`Engine::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of programs in the population.
    pub population_size: usize,
    /// Byte capacity of each program buffer; logical lengths stay strictly
    /// below it.
    pub program_capacity: usize,
    /// Per-node mutation probability.
    pub node_mutation_prob: f64,
    /// Probability of crossover (vs. copy-and-mutate) per replacement.
    pub crossover_prob: f64,
    /// Competitors drawn per tournament, beyond the initial candidate.
    pub tournament_size: usize,
    /// Seed for the shared random stream.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            population_size: 10_000,
            program_capacity: 100,
            node_mutation_prob: 0.05,
            crossover_prob: 0.9,
            tournament_size: 2,
            seed: 42,
        }
    }
}

/// Summary statistics over the current population.
#[derive(Debug, Clone, Copy)]
pub struct PopulationStats {
    /// Fitness of the best individual.
    pub best_fitness: f64,
    /// Mean fitness across the population.
    pub mean_fitness: f64,
    /// Mean logical program length.
    pub mean_len: f64,
}

/// A symbolic-regression evolution engine.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    alphabet: Alphabet,
    problem: Problem,
    consts: Vec<f64>,
    programs: Vec<Program>,
    fitness: Vec<f64>,
    scratch: Program,
    rng: Lcg48,
    generation: u32,
}

impl Engine {
    /// Build an engine: validate the configuration, sample the constant
    /// pool, then grow and score the initial population.
    ///
    /// The draw order is fixed: one float per constant, then the growth
    /// draws of program 0, 1, ... in order. Scoring draws nothing, so the
    /// initial population is scored in parallel.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] describing the first invalid parameter; no
    /// partially constructed engine is ever returned.
    pub fn new(problem: &Problem, config: EngineConfig) -> Result<Self, EngineError> {
        validate(problem, &config)?;

        let alphabet = Alphabet::new(problem.num_vars(), problem.num_consts());
        let mut rng = Lcg48::new(config.seed);

        let (min_rand, max_rand) = problem.const_range();
        let consts: Vec<f64> = (0..problem.num_consts())
            .map(|_| (max_rand - min_rand) * rng.next_f64() + min_rand)
            .collect();

        let mut programs = vec![Program::with_capacity(config.program_capacity); config.population_size];
        for program in &mut programs {
            program.grow(&alphabet, &mut rng);
        }
        let fitness = score_population(&programs, &alphabet, &consts, problem);

        Ok(Self {
            config,
            alphabet,
            problem: problem.clone(),
            consts,
            programs,
            fitness,
            scratch: Program::with_capacity(config.program_capacity),
            rng,
            generation: 0,
        })
    }

    /// Run one full steady-state pass: `population_size` replacement
    /// events, each replacing a negative-tournament victim with either a
    /// crossover offspring or a mutated copy of a tournament winner.
    pub fn evolve(&mut self) {
        for _ in 0..self.config.population_size {
            let victim = negative_tournament(
                &self.fitness,
                self.config.tournament_size,
                &mut self.rng,
            );

            if self.rng.next_f64() < self.config.crossover_prob {
                self.crossover_into(victim);
            } else {
                self.copy_and_mutate_into(victim);
            }

            self.fitness[victim] =
                fitness(&self.programs[victim], &self.alphabet, &self.consts, &self.problem);
        }
        self.generation += 1;
    }

    /// Replace `victim` with the offspring of two tournament winners.
    ///
    /// Parents are redrawn until they differ from each other and from the
    /// victim. If neither crossover composition fits the capacity, the
    /// victim instead receives a mutated copy of the first parent.
    fn crossover_into(&mut self, victim: usize) {
        // Fewer than three individuals cannot supply two parents distinct
        // from the victim.
        if self.programs.len() < 3 {
            self.copy_and_mutate_into(victim);
            return;
        }

        let (parent1, parent2) = loop {
            let p1 = tournament(&self.fitness, self.config.tournament_size, &mut self.rng);
            let p2 = tournament(&self.fitness, self.config.tournament_size, &mut self.rng);
            if p1 != p2 && p1 != victim && p2 != victim {
                break (p1, p2);
            }
        };

        let fits = crossover(
            &self.programs[parent1],
            &self.programs[parent2],
            &self.alphabet,
            &mut self.rng,
            &mut self.scratch,
        );
        if fits {
            self.programs[victim].copy_from(&self.scratch);
        } else {
            // Pathological subtree sizes: neither composition fits. Fall
            // back to the mutation path with the first parent.
            self.scratch.copy_from(&self.programs[parent1]);
            self.programs[victim].copy_from(&self.scratch);
            mutate(
                &mut self.programs[victim],
                &self.alphabet,
                self.config.node_mutation_prob,
                &mut self.rng,
            );
        }
    }

    /// Replace `victim` with a mutated copy of one tournament winner.
    fn copy_and_mutate_into(&mut self, victim: usize) {
        let parent = loop {
            let p = tournament(&self.fitness, self.config.tournament_size, &mut self.rng);
            if p != victim || self.programs.len() == 1 {
                break p;
            }
        };

        self.scratch.copy_from(&self.programs[parent]);
        self.programs[victim].copy_from(&self.scratch);
        mutate(
            &mut self.programs[victim],
            &self.alphabet,
            self.config.node_mutation_prob,
            &mut self.rng,
        );
    }

    /// Index of the best individual (first occurrence on ties).
    #[must_use]
    pub fn best(&self) -> usize {
        let mut best = 0;
        for (i, &fit) in self.fitness.iter().enumerate().skip(1) {
            if fit > self.fitness[best] {
                best = i;
            }
        }
        best
    }

    /// Fitness of individual `index`.
    #[must_use]
    pub fn fitness_of(&self, index: usize) -> f64 {
        self.fitness[index]
    }

    /// Logical length of individual `index`.
    #[must_use]
    pub fn len_of(&self, index: usize) -> usize {
        self.programs[index].len(&self.alphabet)
    }

    /// Render individual `index` as text with `precision` fractional digits
    /// on constants.
    #[must_use]
    pub fn render(&self, index: usize, precision: usize) -> String {
        self.programs[index].render(&self.alphabet, &self.consts, precision)
    }

    /// Number of completed evolution passes.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Number of individuals in the population.
    #[must_use]
    pub fn population_size(&self) -> usize {
        self.programs.len()
    }

    /// The run's sampled constant pool.
    #[must_use]
    pub fn constants(&self) -> &[f64] {
        &self.consts
    }

    /// The run's configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The population's programs (index-aligned with the fitness array).
    #[must_use]
    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    /// The population's fitness array.
    #[must_use]
    pub fn fitness_values(&self) -> &[f64] {
        &self.fitness
    }

    /// Summary statistics over the current population.
    #[must_use]
    pub fn stats(&self) -> PopulationStats {
        let n = self.programs.len() as f64;
        let mean_fitness = self.fitness.iter().sum::<f64>() / n;
        let total_len: usize = (0..self.programs.len()).map(|i| self.len_of(i)).sum();
        PopulationStats {
            best_fitness: self.fitness[self.best()],
            mean_fitness,
            mean_len: total_len as f64 / n,
        }
    }

    /// Snapshot the full run state for persistence.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            generation: self.generation,
            config: self.config,
            constants: self.consts.clone(),
            population: self.programs.clone(),
            fitness: self.fitness.clone(),
            rng_state: self.rng.state(),
        }
    }

    /// Rebuild an engine from a checkpoint, continuing the run bit-exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint's shape disagrees with its own
    /// configuration or with the problem.
    pub fn from_checkpoint(problem: &Problem, checkpoint: Checkpoint) -> Result<Self, EngineError> {
        validate(problem, &checkpoint.config)?;

        if checkpoint.population.len() != checkpoint.config.population_size
            || checkpoint.fitness.len() != checkpoint.config.population_size
        {
            return Err(EngineError::CheckpointShape(
                "population and fitness sizes disagree with the configuration",
            ));
        }
        if checkpoint.constants.len() != problem.num_consts() {
            return Err(EngineError::CheckpointShape(
                "constant pool size disagrees with the problem",
            ));
        }
        if checkpoint
            .population
            .iter()
            .any(|p| p.capacity() != checkpoint.config.program_capacity)
        {
            return Err(EngineError::CheckpointShape(
                "program capacity disagrees with the configuration",
            ));
        }

        // Program bytes come from disk: reject anything that does not decode
        // to a well-formed tree before any traversal runs on it.
        let alphabet = Alphabet::new(problem.num_vars(), problem.num_consts());
        if checkpoint
            .population
            .iter()
            .any(|p| p.checked_len(&alphabet).is_none())
        {
            return Err(EngineError::CheckpointShape(
                "program bytes do not decode to a well-formed tree",
            ));
        }

        Ok(Self {
            alphabet,
            problem: problem.clone(),
            consts: checkpoint.constants,
            programs: checkpoint.population,
            fitness: checkpoint.fitness,
            scratch: Program::with_capacity(checkpoint.config.program_capacity),
            rng: Lcg48::from_state(checkpoint.rng_state),
            generation: checkpoint.generation,
            config: checkpoint.config,
        })
    }

    #[cfg(test)]
    pub(crate) fn set_program_for_test(&mut self, index: usize, bytes: &[u8]) {
        self.programs[index].write_bytes(bytes);
        self.fitness[index] = fitness(
            &self.programs[index],
            &self.alphabet,
            &self.consts,
            &self.problem,
        );
    }
}

fn validate(problem: &Problem, config: &EngineConfig) -> Result<(), EngineError> {
    if config.population_size == 0 {
        return Err(EngineError::EmptyPopulation);
    }
    // Logical length is strictly below capacity, so capacity 1 admits no
    // program at all.
    if config.program_capacity < 2 {
        return Err(EngineError::CapacityTooSmall(config.program_capacity));
    }
    if !(0.0..=1.0).contains(&config.node_mutation_prob) {
        return Err(EngineError::InvalidProbability {
            name: "node_mutation_prob",
            value: config.node_mutation_prob,
        });
    }
    if !(0.0..=1.0).contains(&config.crossover_prob) {
        return Err(EngineError::InvalidProbability {
            name: "crossover_prob",
            value: config.crossover_prob,
        });
    }
    if config.tournament_size == 0 {
        return Err(EngineError::ZeroTournament);
    }
    if problem.num_vars() + problem.num_consts() == 0 {
        return Err(EngineError::NoTerminals);
    }
    if problem.num_vars() + problem.num_consts() + usize::from(NUM_OPS) > 256 {
        return Err(EngineError::AlphabetOverflow {
            terminals: problem.num_vars() + problem.num_consts(),
        });
    }
    let (min_rand, max_rand) = problem.const_range();
    if min_rand > max_rand {
        return Err(EngineError::BadConstantRange {
            min: min_rand,
            max: max_rand,
        });
    }
    Ok(())
}

/// Error constructing an engine.
#[derive(Debug, Clone, Copy)]
pub enum EngineError {
    /// The population size is zero.
    EmptyPopulation,
    /// The program capacity admits no program (must be at least 2).
    CapacityTooSmall(usize),
    /// A probability parameter lies outside `[0, 1]`.
    InvalidProbability {
        /// The parameter's name.
        name: &'static str,
        /// The offending value.
        value: f64,
    },
    /// The tournament size is zero.
    ZeroTournament,
    /// The problem declares no variables and no constants.
    NoTerminals,
    /// Terminals plus opcodes exceed the byte alphabet.
    AlphabetOverflow {
        /// Declared terminal count.
        terminals: usize,
    },
    /// The constant sampling range is inverted.
    BadConstantRange {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// A checkpoint's contents disagree with its configuration or problem.
    CheckpointShape(&'static str),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPopulation => write!(f, "population size must be at least 1"),
            Self::CapacityTooSmall(cap) => {
                write!(f, "program capacity {cap} admits no program (minimum 2)")
            }
            Self::InvalidProbability { name, value } => {
                write!(f, "{name} must be within [0, 1], got {value}")
            }
            Self::ZeroTournament => write!(f, "tournament size must be at least 1"),
            Self::NoTerminals => {
                write!(f, "problem declares no variables and no constants")
            }
            Self::AlphabetOverflow { terminals } => {
                write!(f, "{terminals} terminals plus opcodes exceed a byte alphabet")
            }
            Self::BadConstantRange { min, max } => {
                write!(f, "constant range [{min}, {max}] is inverted")
            }
            Self::CheckpointShape(what) => write!(f, "corrupt checkpoint: {what}"),
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::program::NUM_UNARY_OPS;
    use crate::problem::Case;

    fn double_x_problem() -> Problem {
        Problem::new(
            1,
            0,
            (-5.0, 5.0),
            vec![Case::new(vec![1.0], 2.0), Case::new(vec![2.0], 4.0)],
        )
        .expect("valid problem")
    }

    fn small_config() -> EngineConfig {
        EngineConfig {
            population_size: 4,
            program_capacity: 10,
            node_mutation_prob: 0.05,
            crossover_prob: 0.9,
            tournament_size: 2,
            seed: 42,
        }
    }

    #[test]
    fn test_initial_population_is_valid() {
        let engine = Engine::new(&double_x_problem(), small_config()).expect("engine");
        for i in 0..engine.population_size() {
            assert!(engine.len_of(i) <= 10);
            assert!(engine.fitness_of(i).is_finite());
            assert!(engine.fitness_of(i) <= 0.0);
        }
    }

    #[test]
    fn test_validation_rejects_bad_configs() {
        let problem = double_x_problem();
        let mut config = small_config();
        config.population_size = 0;
        assert!(matches!(
            Engine::new(&problem, config),
            Err(EngineError::EmptyPopulation)
        ));

        let mut config = small_config();
        config.program_capacity = 1;
        assert!(matches!(
            Engine::new(&problem, config),
            Err(EngineError::CapacityTooSmall(1))
        ));

        let mut config = small_config();
        config.node_mutation_prob = 1.5;
        assert!(matches!(
            Engine::new(&problem, config),
            Err(EngineError::InvalidProbability { .. })
        ));

        let mut config = small_config();
        config.tournament_size = 0;
        assert!(matches!(
            Engine::new(&problem, config),
            Err(EngineError::ZeroTournament)
        ));
    }

    #[test]
    fn test_validation_rejects_empty_alphabet() {
        let problem = Problem::new(0, 0, (0.0, 1.0), Vec::new()).expect("valid problem");
        assert!(matches!(
            Engine::new(&problem, small_config()),
            Err(EngineError::NoTerminals)
        ));
    }

    #[test]
    fn test_validation_rejects_alphabet_overflow() {
        let problem = Problem::new(200, 100, (0.0, 1.0), Vec::new()).expect("valid problem");
        assert!(matches!(
            Engine::new(&problem, small_config()),
            Err(EngineError::AlphabetOverflow { .. })
        ));
    }

    #[test]
    fn test_best_returns_first_maximum() {
        let mut engine = Engine::new(&double_x_problem(), small_config()).expect("engine");
        let add_byte = 1 + NUM_UNARY_OPS;
        // Two perfect individuals: best() must report the earlier index.
        engine.set_program_for_test(1, &[add_byte, 0, 0]);
        engine.set_program_for_test(3, &[add_byte, 0, 0]);
        assert_eq!(engine.best(), 1);
        assert!(engine.fitness_of(1).abs() < 1e-12);
    }

    #[test]
    fn test_evolve_advances_generation() {
        let mut engine = Engine::new(&double_x_problem(), small_config()).expect("engine");
        assert_eq!(engine.generation(), 0);
        engine.evolve();
        assert_eq!(engine.generation(), 1);
        for i in 0..engine.population_size() {
            assert!(engine.len_of(i) < 10);
            assert!(engine.fitness_of(i).is_finite());
        }
    }

    #[test]
    fn test_runs_are_deterministic() {
        let problem = double_x_problem();
        let mut a = Engine::new(&problem, small_config()).expect("engine a");
        let mut b = Engine::new(&problem, small_config()).expect("engine b");
        for _ in 0..5 {
            a.evolve();
            b.evolve();
        }
        assert_eq!(a.programs(), b.programs());
        assert_eq!(a.fitness_values(), b.fitness_values());
    }

    #[test]
    fn test_perfect_population_keeps_best_at_zero() {
        // With crossover disabled and zero mutation probability, every
        // replacement copies an existing program; a population of perfect
        // individuals stays perfect, so the best fitness never decreases.
        let problem = double_x_problem();
        let config = EngineConfig {
            population_size: 8,
            program_capacity: 10,
            node_mutation_prob: 0.0,
            crossover_prob: 0.0,
            tournament_size: 2,
            seed: 7,
        };
        let mut engine = Engine::new(&problem, config).expect("engine");
        let add_byte = 1 + NUM_UNARY_OPS;
        for i in 0..engine.population_size() {
            engine.set_program_for_test(i, &[add_byte, 0, 0]);
        }
        let mut best_so_far = engine.fitness_of(engine.best());
        assert!(best_so_far.abs() < 1e-12);
        for _ in 0..10 {
            engine.evolve();
            let best = engine.fitness_of(engine.best());
            assert!(best >= best_so_far);
            best_so_far = best;
        }
        assert!(best_so_far.abs() < 1e-12);
    }

    #[test]
    fn test_checkpoint_roundtrip_resumes_bit_exact() {
        let problem = double_x_problem();
        let mut original = Engine::new(&problem, small_config()).expect("engine");
        original.evolve();
        original.evolve();

        let checkpoint = original.checkpoint();
        let mut resumed = Engine::from_checkpoint(&problem, checkpoint).expect("resume");

        original.evolve();
        resumed.evolve();
        assert_eq!(original.programs(), resumed.programs());
        assert_eq!(original.fitness_values(), resumed.fitness_values());
        assert_eq!(original.generation(), resumed.generation());
    }

    #[test]
    fn test_from_checkpoint_rejects_shape_mismatch() {
        let problem = double_x_problem();
        let engine = Engine::new(&problem, small_config()).expect("engine");
        let mut checkpoint = engine.checkpoint();
        checkpoint.fitness.pop();
        assert!(matches!(
            Engine::from_checkpoint(&problem, checkpoint),
            Err(EngineError::CheckpointShape(_))
        ));
    }

    #[test]
    fn test_from_checkpoint_rejects_malformed_program() {
        let problem = double_x_problem();
        let engine = Engine::new(&problem, small_config()).expect("engine");

        // Garbage opcode bytes.
        let mut checkpoint = engine.checkpoint();
        checkpoint.population[0].write_bytes(&[0xFF; 10]);
        assert!(matches!(
            Engine::from_checkpoint(&problem, checkpoint),
            Err(EngineError::CheckpointShape(_))
        ));

        // A tree that runs past the end of the buffer.
        let add_byte = 1 + NUM_UNARY_OPS;
        let mut full = vec![0u8; 10];
        for byte in &mut full[..9] {
            *byte = add_byte;
        }
        let mut checkpoint = engine.checkpoint();
        checkpoint.population[1].write_bytes(&full);
        assert!(matches!(
            Engine::from_checkpoint(&problem, checkpoint),
            Err(EngineError::CheckpointShape(_))
        ));
    }

    #[test]
    fn test_stats_are_consistent() {
        let engine = Engine::new(&double_x_problem(), small_config()).expect("engine");
        let stats = engine.stats();
        assert!(stats.best_fitness >= stats.mean_fitness);
        assert!(stats.mean_len >= 1.0);
        assert!((stats.best_fitness - engine.fitness_of(engine.best())).abs() < 1e-12);
    }
}
