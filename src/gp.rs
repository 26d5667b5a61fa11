//! Genetic Programming module for symbolic regression.
//!
//! This module provides a complete evolutionary framework for discovering
//! arithmetic expressions that fit a table of examples. Candidate
//! expressions are packed preorder byte programs evaluated against the
//! examples; evolution is steady-state with tournament selection.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │         Evolution Engine            │
//! ├─────────────────────────────────────┤
//! │  Selection │ Crossover │ Mutation   │
//! ├─────────────────────────────────────┤
//! │         Fitness Evaluation          │
//! ├─────────────────────────────────────┤
//! │   Packed Preorder Byte Programs     │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use symreg::gp::{Engine, EngineConfig};
//! use symreg::problem::Problem;
//!
//! let problem = Problem::from_file("problem.dat")?;
//! let mut engine = Engine::new(&problem, EngineConfig::default())?;
//! engine.evolve();
//! let best = engine.best();
//! println!("{}", engine.render(best, 2));
//! ```

mod crossover;
mod evolution;
mod fitness;
mod mutation;
mod persistence;
mod program;
mod rng;
mod selection;

pub use crossover::crossover;
pub use evolution::{Engine, EngineConfig, EngineError, PopulationStats};
pub use fitness::{fitness, score_population};
pub use mutation::mutate;
pub use persistence::{checkpoint_path, load_checkpoint, save_checkpoint, Checkpoint};
pub use program::{
    protected_div, Alphabet, Program, NUM_BINARY_OPS, NUM_OPS, NUM_UNARY_OPS, ZERO_DIV_EPSILON,
    ZERO_DIV_FALLBACK,
};
pub use rng::Lcg48;
pub use selection::{negative_tournament, tournament};
