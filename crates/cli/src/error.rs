//! Failures surfaced by the `procgen` binary, each tied to an exit code.
//!
//! | code | meaning |
//! |------|---------|
//! | 2  | argument parsing (clap, before `run`) |
//! | 10 | the generator rejected its configuration |
//! | 11 | a seed file could not be read or an export could not be written |
//! | 12 | `--params` or a seed file is not valid input |
//! | 13 | the result could not be serialized for output |

use procgen_core::ProcgenError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Construction or generation failed inside the library.
    #[error(transparent)]
    Generator(ProcgenError),

    /// The seed file given to `replay` could not be read.
    #[error("cannot read seed file {}: {source}", path.display())]
    SeedRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The seed file is not JSON, or not shaped like a seed.
    #[error("invalid seed file {}: {source}", path.display())]
    SeedParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `--params` is not valid JSON.
    #[error("invalid --params JSON: {0}")]
    Params(#[source] serde_json::Error),

    /// Writing an exported record failed.
    #[error("export failed: {0}")]
    Export(String),

    /// A record or listing could not be rendered as JSON.
    #[error("cannot serialize output: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Generator(_) => 10,
            CliError::SeedRead { .. } | CliError::Export(_) => 11,
            CliError::SeedParse { .. } | CliError::Params(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

/// Export failures carry `ProcgenError::Io`; everything else is a
/// generator error.
impl From<ProcgenError> for CliError {
    fn from(e: ProcgenError) -> Self {
        match e {
            ProcgenError::Io(msg) => CliError::Export(msg),
            other => CliError::Generator(other),
        }
    }
}
