//! Persistence for evolution state.
//!
//! Checkpoints are JSON documents holding everything needed to resume a run
//! bit-exactly: configuration, constant pool, population, fitness array, and
//! the raw random-stream state. JSON keeps checkpoints inspectable with
//! ordinary tools.

use crate::gp::evolution::EngineConfig;
use crate::gp::program::Program;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Evolution checkpoint containing the full run state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Number of completed evolution passes.
    pub generation: u32,
    /// The run's configuration.
    pub config: EngineConfig,
    /// The sampled constant pool.
    pub constants: Vec<f64>,
    /// Population of programs.
    pub population: Vec<Program>,
    /// Fitness values, index-aligned with the population.
    pub fitness: Vec<f64>,
    /// Raw 48-bit random-stream state, not the seed: resuming continues the
    /// stream exactly where the checkpoint left it.
    pub rng_state: u64,
}

/// Save a checkpoint to a file.
///
/// # Errors
///
/// Returns an error if serialization or file I/O fails.
pub fn save_checkpoint(checkpoint: &Checkpoint, path: &Path) -> io::Result<()> {
    let json = serde_json::to_string(checkpoint)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, json)
}

/// Load a checkpoint from a file.
///
/// # Errors
///
/// Returns an error if the file is unreadable or not a valid checkpoint.
pub fn load_checkpoint(path: &Path) -> io::Result<Checkpoint> {
    let json = fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Get the path for a generation checkpoint file.
#[must_use]
pub fn checkpoint_path(output_dir: &Path, generation: u32) -> PathBuf {
    output_dir.join(format!("gen_{generation:05}.json"))
}
