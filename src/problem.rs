//! Problem definitions for symbolic regression.
//!
//! A problem is a fixed table of (inputs, target) examples plus the
//! parameters governing the constant pool: how many constants to sample and
//! the range to sample them from. The on-disk format is whitespace-separated
//! tokens: a header `num_vars num_consts min_rand max_rand num_examples`
//! followed by `num_examples` rows of `num_vars` inputs and one target.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::Path;

/// One example row: input values and the target output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    inputs: Vec<f64>,
    target: f64,
}

impl Case {
    /// Create a case from inputs and a target.
    #[must_use]
    pub fn new(inputs: Vec<f64>, target: f64) -> Self {
        Self { inputs, target }
    }

    /// Input values, one per variable.
    #[must_use]
    pub fn inputs(&self) -> &[f64] {
        &self.inputs
    }

    /// Target output.
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }
}

/// An immutable symbolic-regression problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    num_vars: usize,
    num_consts: usize,
    min_rand: f64,
    max_rand: f64,
    cases: Vec<Case>,
}

impl Problem {
    /// Build a problem from parts, validating that every case carries
    /// exactly `num_vars` inputs.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::CaseArity`] on a row with the wrong number of
    /// inputs.
    pub fn new(
        num_vars: usize,
        num_consts: usize,
        const_range: (f64, f64),
        cases: Vec<Case>,
    ) -> Result<Self, ProblemError> {
        for (row, case) in cases.iter().enumerate() {
            if case.inputs.len() != num_vars {
                return Err(ProblemError::CaseArity {
                    row,
                    expected: num_vars,
                    found: case.inputs.len(),
                });
            }
        }
        Ok(Self {
            num_vars,
            num_consts,
            min_rand: const_range.0,
            max_rand: const_range.1,
            cases,
        })
    }

    /// Load a problem from a whitespace-token text file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or its contents are
    /// malformed. No partially constructed problem is ever returned.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProblemError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse a problem from whitespace-token text.
    ///
    /// Tokens past the announced example count are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error on a missing or non-numeric token.
    pub fn parse(text: &str) -> Result<Self, ProblemError> {
        let mut tokens = text.split_whitespace();

        let num_vars = next_usize(&mut tokens, "num_vars")?;
        let num_consts = next_usize(&mut tokens, "num_consts")?;
        let min_rand = next_f64(&mut tokens, "min_rand")?;
        let max_rand = next_f64(&mut tokens, "max_rand")?;
        let num_examples = next_usize(&mut tokens, "num_examples")?;

        let mut cases = Vec::with_capacity(num_examples);
        for _ in 0..num_examples {
            let mut inputs = Vec::with_capacity(num_vars);
            for _ in 0..num_vars {
                inputs.push(next_f64(&mut tokens, "example input")?);
            }
            let target = next_f64(&mut tokens, "example target")?;
            cases.push(Case { inputs, target });
        }

        Ok(Self {
            num_vars,
            num_consts,
            min_rand,
            max_rand,
            cases,
        })
    }

    /// Number of input variables per example.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Number of constants to sample for the run.
    #[must_use]
    pub fn num_consts(&self) -> usize {
        self.num_consts
    }

    /// Inclusive sampling range for the constant pool.
    #[must_use]
    pub fn const_range(&self) -> (f64, f64) {
        (self.min_rand, self.max_rand)
    }

    /// The example table.
    #[must_use]
    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    /// Number of examples.
    #[must_use]
    pub fn num_cases(&self) -> usize {
        self.cases.len()
    }
}

fn next_usize<'a, I: Iterator<Item = &'a str>>(
    tokens: &mut I,
    field: &'static str,
) -> Result<usize, ProblemError> {
    let token = tokens.next().ok_or(ProblemError::MissingToken { field })?;
    token.parse().map_err(|_| ProblemError::InvalidToken {
        field,
        token: token.to_string(),
    })
}

fn next_f64<'a, I: Iterator<Item = &'a str>>(
    tokens: &mut I,
    field: &'static str,
) -> Result<f64, ProblemError> {
    let token = tokens.next().ok_or(ProblemError::MissingToken { field })?;
    token.parse().map_err(|_| ProblemError::InvalidToken {
        field,
        token: token.to_string(),
    })
}

/// Error loading or building a problem.
#[derive(Debug)]
pub enum ProblemError {
    /// The problem file could not be read.
    Io(io::Error),
    /// The input ended before a required field.
    MissingToken {
        /// The field that was being read.
        field: &'static str,
    },
    /// A token failed to parse as a number.
    InvalidToken {
        /// The field that was being read.
        field: &'static str,
        /// The offending token.
        token: String,
    },
    /// A programmatically supplied case has the wrong number of inputs.
    CaseArity {
        /// Zero-based row index.
        row: usize,
        /// Expected input count (`num_vars`).
        expected: usize,
        /// Actual input count.
        found: usize,
    },
}

impl fmt::Display for ProblemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cannot read problem file: {e}"),
            Self::MissingToken { field } => {
                write!(f, "problem file ended while reading {field}")
            }
            Self::InvalidToken { field, token } => {
                write!(f, "invalid {field} token: {token:?}")
            }
            Self::CaseArity {
                row,
                expected,
                found,
            } => {
                write!(
                    f,
                    "case {row} has {found} inputs, expected {expected}"
                )
            }
        }
    }
}

impl std::error::Error for ProblemError {}

impl From<io::Error> for ProblemError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
