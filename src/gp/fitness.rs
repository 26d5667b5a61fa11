//! Fitness evaluation.
//!
//! Fitness is the negated sum of absolute errors over the full example
//! table, so zero is the unique maximum (a perfect fit) and more negative
//! is worse. Evaluation is read-only over shared immutable data and draws
//! no randomness, so whole-population scoring is free to run in parallel
//! without touching the reproducibility contract.

use crate::gp::program::{Alphabet, Program};
use crate::problem::Problem;
use rayon::prelude::*;

/// Score one program against every example of the problem.
#[must_use]
pub fn fitness(program: &Program, alphabet: &Alphabet, consts: &[f64], problem: &Problem) -> f64 {
    let mut total = 0.0;
    for case in problem.cases() {
        let result = program.eval(alphabet, consts, case.inputs());
        total += (result - case.target()).abs();
    }
    -total
}

/// Score every program of a population.
///
/// Programs are scored in parallel; the returned vector is index-aligned
/// with the input slice.
#[must_use]
pub fn score_population(
    programs: &[Program],
    alphabet: &Alphabet,
    consts: &[f64],
    problem: &Problem,
) -> Vec<f64> {
    programs
        .par_iter()
        .map(|program| fitness(program, alphabet, consts, problem))
        .collect()
}
