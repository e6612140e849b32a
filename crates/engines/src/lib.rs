#![deny(unsafe_code)]
//! Generator registry: maps generator names to implementations and runs a
//! [`Seed`] to a serializable [`Artifact`].
//!
//! This crate sits between `procgen-core` (which defines the `Generator`
//! trait) and the individual generator crates (`procgen-noise`,
//! `procgen-particles`, etc.). The CLI depends on it so dispatch lives in one
//! place.

pub mod export;

pub use export::{write_json, Record};

use glam::DVec2;
use procgen_automaton::CellularAutomaton;
use procgen_core::error::ProcgenError;
use procgen_core::{Generator, Grid, Palette, PaletteGenerator, RandomStream, Seed};
use procgen_lsystem::{LSystemGenerator, LSystemPath};
use procgen_noise::{FlowField, GradientNoise};
use procgen_particles::{ParticleSim, Simulation};
use serde::Serialize;
use serde_json::Value;

/// All available generator names.
const GENERATOR_NAMES: &[&str] = &[
    "noise",
    "flow-field",
    "particles",
    "automaton",
    "lsystem",
    "palette",
];

/// Enumeration of all available generators.
///
/// Wraps each generator and delegates `Generator` trait methods.
/// Use [`GeneratorKind::from_name`] for string-based construction (CLI).
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorKind {
    /// Gradient noise scalar grid.
    Noise(GradientNoise),
    /// Unit-vector flow field.
    FlowField(FlowField),
    /// Particle animation steered by a flow field.
    Particles(ParticleSim),
    /// Randomized-rule cellular automaton.
    Automaton(CellularAutomaton),
    /// Turtle-traced L-system.
    LSystem(LSystemGenerator),
    /// Random HSL palette.
    Palette(PaletteGenerator),
}

/// Output of any registered generator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Artifact {
    Scalar(Grid<f64>),
    Vector(Grid<DVec2>),
    Frames(Simulation),
    Generations(Vec<Grid<bool>>),
    Path(LSystemPath),
    Palette(Palette),
}

impl GeneratorKind {
    /// Constructs a generator by name.
    ///
    /// A non-zero `steps` overrides the generator's step count: frames for
    /// `particles`, generations for `automaton`, rewrite iterations for
    /// `lsystem`. The other generators ignore it.
    ///
    /// Returns `ProcgenError::UnknownGenerator` if the name is not recognized.
    pub fn from_name(
        name: &str,
        width: usize,
        height: usize,
        steps: usize,
        params: &Value,
    ) -> Result<Self, ProcgenError> {
        let kind = match name {
            "noise" => GeneratorKind::Noise(GradientNoise::from_json(width, height, params)?),
            "flow-field" => GeneratorKind::FlowField(FlowField::from_json(width, height, params)?),
            "particles" => {
                let mut sim = ParticleSim::from_json(width, height, params)?;
                if steps > 0 {
                    sim.frames = steps;
                }
                GeneratorKind::Particles(sim)
            }
            "automaton" => {
                let mut ca = CellularAutomaton::from_json(width, height, params)?;
                if steps > 0 {
                    ca.params.iterations = steps;
                }
                GeneratorKind::Automaton(ca)
            }
            "lsystem" => {
                let mut ls = LSystemGenerator::from_json(params)?;
                if steps > 0 {
                    ls.iterations = steps;
                }
                GeneratorKind::LSystem(ls)
            }
            "palette" => GeneratorKind::Palette(PaletteGenerator::from_json(params)?),
            _ => return Err(ProcgenError::UnknownGenerator(name.to_string())),
        };
        Ok(kind)
    }

    /// Validates `seed` and constructs the generator it names.
    pub fn from_seed(seed: &Seed) -> Result<Self, ProcgenError> {
        seed.validate()?;
        Self::from_name(
            &seed.generator,
            seed.width,
            seed.height,
            seed.steps,
            &seed.params,
        )
    }

    /// Returns a slice of all recognized generator names.
    pub fn list_generators() -> &'static [&'static str] {
        GENERATOR_NAMES
    }

    /// The registry name of this generator.
    pub fn name(&self) -> &'static str {
        match self {
            GeneratorKind::Noise(_) => "noise",
            GeneratorKind::FlowField(_) => "flow-field",
            GeneratorKind::Particles(_) => "particles",
            GeneratorKind::Automaton(_) => "automaton",
            GeneratorKind::LSystem(_) => "lsystem",
            GeneratorKind::Palette(_) => "palette",
        }
    }
}

impl Generator for GeneratorKind {
    type Output = Artifact;

    fn generate(&self, rng: &mut RandomStream) -> Result<Artifact, ProcgenError> {
        let artifact = match self {
            GeneratorKind::Noise(g) => Artifact::Scalar(g.generate(rng)?),
            GeneratorKind::FlowField(g) => Artifact::Vector(g.generate(rng)?),
            GeneratorKind::Particles(g) => Artifact::Frames(g.generate(rng)?),
            GeneratorKind::Automaton(g) => Artifact::Generations(g.generate(rng)?),
            GeneratorKind::LSystem(g) => Artifact::Path(g.generate(rng)?),
            GeneratorKind::Palette(g) => Artifact::Palette(g.generate(rng)?),
        };
        Ok(artifact)
    }

    fn params(&self) -> Value {
        match self {
            GeneratorKind::Noise(g) => g.params(),
            GeneratorKind::FlowField(g) => g.params(),
            GeneratorKind::Particles(g) => g.params(),
            GeneratorKind::Automaton(g) => g.params(),
            GeneratorKind::LSystem(g) => g.params(),
            GeneratorKind::Palette(g) => g.params(),
        }
    }

    fn param_schema(&self) -> Value {
        match self {
            GeneratorKind::Noise(g) => g.param_schema(),
            GeneratorKind::FlowField(g) => g.param_schema(),
            GeneratorKind::Particles(g) => g.param_schema(),
            GeneratorKind::Automaton(g) => g.param_schema(),
            GeneratorKind::LSystem(g) => g.param_schema(),
            GeneratorKind::Palette(g) => g.param_schema(),
        }
    }
}

/// Runs the generator named by `seed` on a fresh stream at its seed.
pub fn generate(seed: &Seed) -> Result<Artifact, ProcgenError> {
    let generator = GeneratorKind::from_seed(seed)?;
    tracing::debug!(
        generator = generator.name(),
        width = seed.width,
        height = seed.height,
        seed = seed.seed,
        steps = seed.steps,
        "running generator"
    );
    generator.generate(&mut seed.stream())
}
