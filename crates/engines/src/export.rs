//! JSON export of generated artifacts.
//!
//! A [`Record`] pairs an artifact with the [`Seed`] that produced it, so any
//! exported file carries what is needed to replay it.

use crate::{generate, Artifact};
use procgen_core::error::ProcgenError;
use procgen_core::Seed;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A generated artifact together with its reproducible seed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub seed: Seed,
    pub artifact: Artifact,
}

impl Record {
    /// Runs `seed` and wraps the result.
    pub fn generate(seed: Seed) -> Result<Self, ProcgenError> {
        let artifact = generate(&seed)?;
        Ok(Self { seed, artifact })
    }
}

/// Writes `value` as pretty-printed JSON to `path`.
///
/// Returns `ProcgenError::Io` if the file cannot be created or written.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), ProcgenError> {
    let file = File::create(path).map_err(|e| io_error(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| io_error(path, e))?;
    writer.write_all(b"\n").map_err(|e| io_error(path, e))?;
    writer.flush().map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, e: impl fmt::Display) -> ProcgenError {
    ProcgenError::Io(format!("{}: {e}", path.display()))
}
