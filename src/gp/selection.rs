//! Tournament selection over the population's fitness array.
//!
//! Both tournaments draw one initial candidate plus `tournament_size`
//! competitors, all uniform with replacement, and keep the extreme member
//! under a strict comparison (ties favor the earlier-held index). The draw
//! order matters: one draw for the initial candidate, then one per
//! competitor.

use crate::gp::rng::Lcg48;

/// Positive tournament: the index of the fittest sampled individual.
///
/// Used to choose parents.
pub fn tournament(fitness: &[f64], tournament_size: usize, rng: &mut Lcg48) -> usize {
    let mut best = rng.below(fitness.len());
    for _ in 0..tournament_size {
        let competitor = rng.below(fitness.len());
        if fitness[competitor] > fitness[best] {
            best = competitor;
        }
    }
    best
}

/// Negative tournament: the index of the least fit sampled individual.
///
/// Used to choose the replacement victim.
pub fn negative_tournament(fitness: &[f64], tournament_size: usize, rng: &mut Lcg48) -> usize {
    let mut worst = rng.below(fitness.len());
    for _ in 0..tournament_size {
        let competitor = rng.below(fitness.len());
        if fitness[competitor] < fitness[worst] {
            worst = competitor;
        }
    }
    worst
}
