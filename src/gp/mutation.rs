//! Per-node mutation.
//!
//! Every node of a program is independently reassigned with a fixed
//! probability. Terminals become a fresh random terminal; operators become
//! a fresh random operator of the same arity class. Tree shape, and
//! therefore logical length, is invariant under mutation.

// Replacement bytes are assembled from small indices.
#![allow(clippy::cast_possible_truncation)]

use crate::gp::program::{Alphabet, Program, NUM_BINARY_OPS, NUM_UNARY_OPS};
use crate::gp::rng::Lcg48;

/// Mutate `program` in place.
///
/// Walks the logical length once; each node draws one probability float
/// and, when selected, one replacement draw.
pub fn mutate(program: &mut Program, alphabet: &Alphabet, node_mutation_prob: f64, rng: &mut Lcg48) {
    let len = program.len(alphabet);
    let terminals = alphabet.num_terminals();

    let code = program.bytes_mut();
    for byte in &mut code[..len] {
        if rng.next_f64() >= node_mutation_prob {
            continue;
        }
        if usize::from(*byte) < terminals {
            *byte = rng.below(terminals) as u8;
        } else if usize::from(*byte) < terminals + usize::from(NUM_UNARY_OPS) {
            *byte = (terminals + rng.below(usize::from(NUM_UNARY_OPS))) as u8;
        } else {
            let func = usize::from(NUM_UNARY_OPS) + rng.below(usize::from(NUM_BINARY_OPS));
            *byte = (terminals + func) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grown(alphabet: &Alphabet, capacity: usize, seed: u64) -> Program {
        let mut rng = Lcg48::new(seed);
        let mut program = Program::with_capacity(capacity);
        program.grow(alphabet, &mut rng);
        program
    }

    #[test]
    fn test_mutation_preserves_length() {
        let alphabet = Alphabet::new(2, 2);
        let mut rng = Lcg48::new(42);
        for seed in 0..30u64 {
            let mut program = grown(&alphabet, 40, seed);
            let before = program.len(&alphabet);
            mutate(&mut program, &alphabet, 1.0, &mut rng);
            assert_eq!(program.len(&alphabet), before);
        }
    }

    #[test]
    fn test_mutation_preserves_arity_class() {
        let alphabet = Alphabet::new(2, 2);
        let terminals = alphabet.num_terminals();
        let mut rng = Lcg48::new(7);
        for seed in 0..30u64 {
            let mut program = grown(&alphabet, 40, seed);
            let original = program.clone();
            let len = program.len(&alphabet);
            mutate(&mut program, &alphabet, 1.0, &mut rng);
            for i in 0..len {
                let old = usize::from(original.as_bytes()[i]);
                let new = usize::from(program.as_bytes()[i]);
                let unary_end = terminals + usize::from(NUM_UNARY_OPS);
                if old < terminals {
                    assert!(new < terminals);
                } else if old < unary_end {
                    assert!((terminals..unary_end).contains(&new));
                } else {
                    assert!(new >= unary_end);
                    assert!(new < unary_end + usize::from(NUM_BINARY_OPS));
                }
            }
        }
    }

    #[test]
    fn test_zero_probability_is_identity() {
        let alphabet = Alphabet::new(1, 1);
        let mut rng = Lcg48::new(3);
        let mut program = grown(&alphabet, 30, 12);
        let original = program.clone();
        mutate(&mut program, &alphabet, 0.0, &mut rng);
        assert_eq!(program, original);
    }

    #[test]
    fn test_stale_bytes_untouched() {
        let alphabet = Alphabet::new(1, 0);
        let mut program = Program::with_capacity(8);
        program.write_bytes(&[0, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x11]);
        let mut rng = Lcg48::new(1);
        mutate(&mut program, &alphabet, 1.0, &mut rng);
        // Only the single logical node may change; the stale tail must not.
        assert_eq!(&program.as_bytes()[1..], &[0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x11]);
    }

    #[test]
    fn test_mutation_is_deterministic() {
        let alphabet = Alphabet::new(2, 1);
        let mut a = grown(&alphabet, 30, 5);
        let mut b = a.clone();
        let mut rng_a = Lcg48::new(99);
        let mut rng_b = Lcg48::new(99);
        mutate(&mut a, &alphabet, 0.5, &mut rng_a);
        mutate(&mut b, &alphabet, 0.5, &mut rng_b);
        assert_eq!(a, b);
    }
}
