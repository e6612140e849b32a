//! The `Generator` trait every procedural generator implements.
//!
//! A generator is a configured, immutable recipe. Running it borrows the
//! session's [`RandomStream`] for the duration of the call and returns a fully
//! materialized output; nothing is streamed or left half-built.

use crate::error::ProcgenError;
use crate::prng::RandomStream;
use serde_json::Value;

/// Core trait for procedural generators.
///
/// The trait is object-safe for a fixed output type, so
/// `Box<dyn Generator<Output = Grid<f64>>>` can hold any scalar-grid source.
pub trait Generator {
    /// What one run produces (a grid, a list of frames, a path, ...).
    type Output;

    /// Runs the generator to completion, drawing every random value from `rng`.
    fn generate(&self, rng: &mut RandomStream) -> Result<Self::Output, ProcgenError>;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;
}
