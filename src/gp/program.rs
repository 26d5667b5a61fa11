//! Packed-byte expression programs and their traversal primitives.
//!
//! A program is the preorder serialization of an expression tree in a
//! fixed-capacity byte buffer. Each byte is one node: `b < num_vars` reads
//! input variable `b`, `b < num_vars + num_consts` reads constant
//! `b - num_vars`, and anything above selects an opcode. An operator byte is
//! immediately followed by the bytes of its first child, then (for binary
//! operators) its second child, so a tree is copyable with plain `memcpy`
//! and needs no per-node allocation.
//!
//! The logical length of a program is never stored; it is recomputed by a
//! preorder skip from offset 0. Bytes past the logical length are stale.

// Opcode bytes are assembled from small indices with intentional casts.
#![allow(clippy::cast_possible_truncation)]

use crate::gp::rng::Lcg48;
use serde::{Deserialize, Serialize};

/// Divisors below this magnitude trigger the protected-divide fallback.
pub const ZERO_DIV_EPSILON: f64 = 1e-3;

/// Magnitude of the protected-divide fallback value.
pub const ZERO_DIV_FALLBACK: f64 = 1e6;

/// Number of unary opcodes (sin, cos) when the `trig` feature is enabled.
#[cfg(feature = "trig")]
pub const NUM_UNARY_OPS: u8 = 2;

/// Number of unary opcodes; the `trig` feature is disabled so there are none.
#[cfg(not(feature = "trig"))]
pub const NUM_UNARY_OPS: u8 = 0;

/// Number of binary opcodes (add, sub, mul, protected div).
pub const NUM_BINARY_OPS: u8 = 4;

/// Total opcode count. Unary opcodes come first, binary after.
pub const NUM_OPS: u8 = NUM_UNARY_OPS + NUM_BINARY_OPS;

#[cfg(feature = "trig")]
const SIN: u8 = 0;
const ADD: u8 = NUM_UNARY_OPS;
const SUB: u8 = NUM_UNARY_OPS + 1;
const MUL: u8 = NUM_UNARY_OPS + 2;
const DIV: u8 = NUM_UNARY_OPS + 3;

/// Whole-tree rebuild attempts before `grow` falls back to a lone terminal.
const GROW_RETRY_LIMIT: usize = 128;

/// Whether an opcode index belongs to the unary class.
#[cfg(feature = "trig")]
fn is_unary_op(func: u8) -> bool {
    func < NUM_UNARY_OPS
}

/// Whether an opcode index belongs to the unary class.
#[cfg(not(feature = "trig"))]
fn is_unary_op(_func: u8) -> bool {
    false
}

/// The terminal/opcode byte layout shared by every component of one run.
///
/// The split point between variables, constants, and opcodes is fixed at
/// engine construction and never changes while a population is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alphabet {
    num_vars: usize,
    num_consts: usize,
}

impl Alphabet {
    /// Create a layout for `num_vars` variables and `num_consts` constants.
    ///
    /// The engine validates that at least one terminal exists and that the
    /// whole alphabet fits in a byte before building programs on top.
    #[must_use]
    pub fn new(num_vars: usize, num_consts: usize) -> Self {
        Self {
            num_vars,
            num_consts,
        }
    }

    /// Number of input variables.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Number of constants.
    #[must_use]
    pub fn num_consts(&self) -> usize {
        self.num_consts
    }

    /// Number of terminal bytes (variables plus constants).
    #[must_use]
    pub fn num_terminals(&self) -> usize {
        self.num_vars + self.num_consts
    }

    /// Whether a byte encodes a terminal node.
    #[must_use]
    pub fn is_terminal(&self, byte: u8) -> bool {
        usize::from(byte) < self.num_terminals()
    }

    /// Opcode index of an operator byte.
    fn op_index(&self, byte: u8) -> u8 {
        debug_assert!(!self.is_terminal(byte));
        let func = (usize::from(byte) - self.num_terminals()) as u8;
        debug_assert!(func < NUM_OPS, "opcode byte out of range");
        func
    }

    /// Byte encoding the opcode with index `func`.
    fn op_byte(&self, func: u8) -> u8 {
        debug_assert!(func < NUM_OPS);
        (self.num_terminals() + usize::from(func)) as u8
    }
}

/// One individual's encoded expression tree.
///
/// The buffer capacity is fixed at construction; the logical length is
/// always strictly below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    code: Vec<u8>,
}

impl Program {
    /// Create a zero-filled program with the given capacity.
    ///
    /// Byte 0 is the first variable (or constant) terminal, so a fresh
    /// program is already a valid single-node tree for any non-empty
    /// alphabet.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            code: vec![0; capacity],
        }
    }

    /// Buffer capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.code.len()
    }

    /// Raw bytes, including stale bytes past the logical length.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.code
    }

    /// Overwrite this program's bytes wholesale from another of equal
    /// capacity.
    pub fn copy_from(&mut self, other: &Program) {
        self.code.copy_from_slice(&other.code);
    }

    /// Overwrite this program's bytes from a raw slice (tests and loaders).
    ///
    /// The slice must not exceed the capacity; remaining bytes are left as
    /// they were.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.code[..bytes.len()].copy_from_slice(bytes);
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.code
    }

    /// Logical length: the number of bytes one tree starting at offset 0
    /// occupies.
    #[must_use]
    pub fn len(&self, alphabet: &Alphabet) -> usize {
        self.skip(alphabet, 0)
    }

    /// Skip the node starting at `at` and all of its children, returning the
    /// offset immediately past the subtree.
    #[must_use]
    pub fn skip(&self, alphabet: &Alphabet, at: usize) -> usize {
        let byte = self.code[at];
        if alphabet.is_terminal(byte) {
            return at + 1;
        }
        let func = alphabet.op_index(byte);
        if is_unary_op(func) {
            self.skip(alphabet, at + 1)
        } else {
            let past_first = self.skip(alphabet, at + 1);
            self.skip(alphabet, past_first)
        }
    }

    /// Checked logical length for bytes from an untrusted source.
    ///
    /// Returns `None` unless the buffer starts with a well-formed tree:
    /// every byte decodes to a terminal or opcode and the tree ends
    /// strictly below capacity.
    #[must_use]
    pub fn checked_len(&self, alphabet: &Alphabet) -> Option<usize> {
        let len = self.checked_skip(alphabet, 0)?;
        (len < self.code.len()).then_some(len)
    }

    fn checked_skip(&self, alphabet: &Alphabet, at: usize) -> Option<usize> {
        let byte = *self.code.get(at)?;
        if alphabet.is_terminal(byte) {
            return Some(at + 1);
        }
        let func = usize::from(byte) - alphabet.num_terminals();
        if func >= usize::from(NUM_OPS) {
            return None;
        }
        if is_unary_op(func as u8) {
            self.checked_skip(alphabet, at + 1)
        } else {
            let past_first = self.checked_skip(alphabet, at + 1)?;
            self.checked_skip(alphabet, past_first)
        }
    }

    /// Evaluate the program against one example row.
    ///
    /// `inputs` holds the row's variable values; `consts` is the run's
    /// constant table.
    #[must_use]
    pub fn eval(&self, alphabet: &Alphabet, consts: &[f64], inputs: &[f64]) -> f64 {
        let mut cursor = 0;
        self.eval_at(alphabet, consts, inputs, &mut cursor)
    }

    fn eval_at(
        &self,
        alphabet: &Alphabet,
        consts: &[f64],
        inputs: &[f64],
        cursor: &mut usize,
    ) -> f64 {
        let byte = self.code[*cursor];
        *cursor += 1;

        if alphabet.is_terminal(byte) {
            let index = usize::from(byte);
            return if index < alphabet.num_vars() {
                inputs[index]
            } else {
                consts[index - alphabet.num_vars()]
            };
        }

        let func = alphabet.op_index(byte);
        let arg1 = self.eval_at(alphabet, consts, inputs, cursor);

        if is_unary_op(func) {
            #[cfg(feature = "trig")]
            {
                return if func == SIN { arg1.sin() } else { arg1.cos() };
            }
            #[cfg(not(feature = "trig"))]
            unreachable!("unary opcodes are disabled");
        }

        let arg2 = self.eval_at(alphabet, consts, inputs, cursor);
        match func {
            ADD => arg1 + arg2,
            SUB => arg1 - arg2,
            MUL => arg1 * arg2,
            _ => {
                debug_assert_eq!(func, DIV, "opcode byte out of range");
                protected_div(arg1, arg2)
            }
        }
    }

    /// Fill this program with a random tree drawn from the shared stream.
    ///
    /// Construction flips a fair coin at every cursor position: terminal or
    /// operator. A tree that reaches the capacity is rejected and regrown
    /// from scratch; after [`GROW_RETRY_LIMIT`] rejections the program falls
    /// back to a single uniformly chosen terminal, which is valid for any
    /// capacity of at least 2.
    pub fn grow(&mut self, alphabet: &Alphabet, rng: &mut Lcg48) {
        for _ in 0..GROW_RETRY_LIMIT {
            let mut cursor = 0;
            self.grow_at(alphabet, rng, &mut cursor);
            if cursor < self.code.len() {
                return;
            }
        }
        self.code[0] = rng.below(alphabet.num_terminals()) as u8;
    }

    fn grow_at(&mut self, alphabet: &Alphabet, rng: &mut Lcg48, cursor: &mut usize) {
        // A full buffer yields a truncated tree; the caller rejects it.
        if *cursor >= self.code.len() {
            return;
        }

        if rng.below(2) == 1 {
            self.code[*cursor] = rng.below(alphabet.num_terminals()) as u8;
            *cursor += 1;
        } else {
            let func = rng.below(usize::from(NUM_OPS)) as u8;
            self.code[*cursor] = alphabet.op_byte(func);
            *cursor += 1;
            self.grow_at(alphabet, rng, cursor);
            if !is_unary_op(func) {
                self.grow_at(alphabet, rng, cursor);
            }
        }
    }

    /// Render the program as text.
    ///
    /// Variables print 1-based (`X1`, `X2`, ...), constants with `precision`
    /// fractional digits, binary operators fully parenthesized.
    #[must_use]
    pub fn render(&self, alphabet: &Alphabet, consts: &[f64], precision: usize) -> String {
        let mut cursor = 0;
        self.render_at(alphabet, consts, precision, &mut cursor)
    }

    fn render_at(
        &self,
        alphabet: &Alphabet,
        consts: &[f64],
        precision: usize,
        cursor: &mut usize,
    ) -> String {
        let byte = self.code[*cursor];
        *cursor += 1;

        if alphabet.is_terminal(byte) {
            let index = usize::from(byte);
            return if index < alphabet.num_vars() {
                format!("X{}", index + 1)
            } else {
                format!("{:.precision$}", consts[index - alphabet.num_vars()])
            };
        }

        let func = alphabet.op_index(byte);
        let arg1 = self.render_at(alphabet, consts, precision, cursor);

        if is_unary_op(func) {
            #[cfg(feature = "trig")]
            {
                let name = if func == SIN { "sin" } else { "cos" };
                return format!("{name}({arg1})");
            }
            #[cfg(not(feature = "trig"))]
            unreachable!("unary opcodes are disabled");
        }

        let arg2 = self.render_at(alphabet, consts, precision, cursor);
        let symbol = match func {
            ADD => "+",
            SUB => "-",
            MUL => "*",
            _ => "/",
        };
        format!("({arg1} {symbol} {arg2})")
    }
}

/// Division that never raises: a divisor with magnitude below
/// [`ZERO_DIV_EPSILON`] yields `+1e6` or `-1e6`, matching the divisor's sign
/// bit (so `-0.0` yields `-1e6`).
#[must_use]
pub fn protected_div(dividend: f64, divisor: f64) -> f64 {
    if divisor.abs() < ZERO_DIV_EPSILON {
        if divisor.is_sign_negative() {
            -ZERO_DIV_FALLBACK
        } else {
            ZERO_DIV_FALLBACK
        }
    } else {
        dividend / divisor
    }
}
