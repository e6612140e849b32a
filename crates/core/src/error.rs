//! Error types for the procgen core.

use thiserror::Error;

/// Errors produced by generator operations.
#[derive(Debug, Error)]
pub enum ProcgenError {
    /// Width or height was zero (or their product overflowed) when creating a grid.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A row or buffer did not match the expected grid shape.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// A collection that must hold at least one element was empty.
    #[error("empty collection: {0}")]
    EmptyCollection(String),

    /// A parameter had a value outside its valid domain.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A parameter existed but had the wrong JSON type.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// A `]` symbol appeared with no open `[` to restore.
    #[error("unbalanced bracket: ']' at position {position} has no matching '['")]
    UnbalancedBracket { position: usize },

    /// The registry has no generator under this name.
    #[error("unknown generator: {0}")]
    UnknownGenerator(String),

    /// Writing or reading an exported artifact failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl ProcgenError {
    /// Shorthand for [`ProcgenError::InvalidParameter`].
    pub fn invalid_param(name: &str, reason: impl Into<String>) -> Self {
        ProcgenError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
