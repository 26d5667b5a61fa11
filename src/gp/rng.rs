//! Deterministic 48-bit linear congruential generator.
//!
//! This is the engine's only source of randomness. Every component draws
//! from one shared stream, and the order of draws is part of the
//! reproducibility contract: the same seed, problem, and configuration
//! replay the exact same run, bit for bit.

use serde::{Deserialize, Serialize};

/// LCG multiplier (the classic 48-bit `drand48` constant).
const MULTIPLIER: u64 = 0x5_DEEC_E66D;

/// LCG increment.
const INCREMENT: u64 = 0xB;

/// Mask keeping the state within 48 bits.
const STATE_MASK: u64 = (1 << 48) - 1;

/// One draw spans the full 32-bit range; floats divide by 2^32.
const DRAW_RANGE: f64 = 4_294_967_296.0;

/// A 48-bit linear congruential generator.
///
/// Each draw advances `state ← state * 0x5DEECE66D + 0xB mod 2^48` and
/// returns the upper 32 bits of the *new* state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lcg48 {
    state: u64,
}

impl Lcg48 {
    /// Create a generator from a seed.
    ///
    /// The initial state is `(seed XOR 0x5DEECE66D) mod 2^48`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: (seed ^ MULTIPLIER) & STATE_MASK,
        }
    }

    /// Restore a generator from a raw 48-bit state (checkpoint resume).
    #[must_use]
    pub fn from_state(state: u64) -> Self {
        Self {
            state: state & STATE_MASK,
        }
    }

    /// The raw 48-bit state, for checkpointing.
    #[must_use]
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Draw the next unsigned 32-bit value.
    #[allow(clippy::cast_possible_truncation)]
    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT)
            & STATE_MASK;
        (self.state >> 16) as u32
    }

    /// Draw a uniform float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / DRAW_RANGE
    }

    /// Draw a uniform index in `[0, n)`.
    ///
    /// Modulo bias is accepted for the small `n` used by the engine.
    #[allow(clippy::cast_possible_truncation)]
    pub fn below(&mut self, n: usize) -> usize {
        debug_assert!(n > 0, "cannot draw an index below zero");
        self.next_u32() as usize % n
    }
}
