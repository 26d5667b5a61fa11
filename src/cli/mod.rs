//! CLI command implementations for symreg.

pub(crate) mod inspect;
pub(crate) mod resume;
pub(crate) mod run;

use std::error::Error;
use std::fmt;

/// A run stops early once the best fitness clears this threshold.
pub(crate) const SOLVED_THRESHOLD: f64 = -1e-6;

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<symreg::ProblemError> for CliError {
    fn from(e: symreg::ProblemError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<symreg::EngineError> for CliError {
    fn from(e: symreg::EngineError) -> Self {
        Self::new(e.to_string())
    }
}
