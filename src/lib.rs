// Allow unwrap, float comparisons, and unreadable literals in tests
// (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
#![cfg_attr(test, allow(clippy::float_cmp))]
//! Symreg: a deterministic genetic-programming engine for symbolic
//! regression.
//!
//! This crate evolves arithmetic expressions that fit a table of
//! (inputs, target) examples. It is designed for:
//! - Bit-exact deterministic runs from a single seed
//! - Compact packed-preorder program representation
//! - Steady-state evolution with tournament selection
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │         Evolution Engine            │
//! ├─────────────────────────────────────┤
//! │       Genetic Operators (gp)        │
//! ├─────────────────────────────────────┤
//! │      Problem / Example Table        │
//! └─────────────────────────────────────┘
//! ```

pub mod gp;
pub mod problem;

// Re-export key types at crate root for convenience
pub use gp::{Engine, EngineConfig, EngineError, Lcg48, PopulationStats, Program};
pub use problem::{Case, Problem, ProblemError};
