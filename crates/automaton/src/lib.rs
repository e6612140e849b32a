#![deny(unsafe_code)]
//! Binary cellular automaton with a randomly drawn rule table.
//!
//! Every cell looks at its 3×3 toroidal neighborhood (itself included). The
//! nine states are packed into a 9-bit key, reading rows top to bottom and
//! columns left to right, with the top-left neighbor as the most significant
//! bit. The key indexes a 512-entry rule table that says whether the cell is
//! alive in the next generation.
//!
//! Randomness is drawn once, up front: first the initial grid (row-major,
//! alive when `next < 0.45`), then the rule table in key order (alive when
//! `next > 0.5`). Stepping is deterministic from there.

use procgen_core::error::ProcgenError;
use procgen_core::params::{param_finite_f64, param_usize};
use procgen_core::{Generator, Grid, RandomStream};
use serde_json::{json, Value};

/// Number of distinct 3×3 neighborhoods.
pub const RULE_SIZE: usize = 512;
/// Default number of recorded generations.
pub const DEFAULT_ITERATIONS: usize = 32;
/// Default probability that an initial cell is alive.
const DEFAULT_DENSITY: f64 = 0.45;
/// A rule entry is alive when its draw exceeds this threshold.
const RULE_THRESHOLD: f64 = 0.5;

/// Lookup table from neighborhood key to next state.
pub type RuleTable = [bool; RULE_SIZE];

/// Tunable constants for the automaton.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutomatonParams {
    /// Probability that a cell starts alive.
    pub density: f64,
    /// Generations recorded by [`Generator::generate`].
    pub iterations: usize,
}

impl Default for AutomatonParams {
    fn default() -> Self {
        Self {
            density: DEFAULT_DENSITY,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl AutomatonParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    ///
    /// `density` must lie in `[0, 1]`.
    pub fn from_json(params: &Value) -> Result<Self, ProcgenError> {
        let density = param_finite_f64(params, "density", DEFAULT_DENSITY)?;
        if !(0.0..=1.0).contains(&density) {
            return Err(ProcgenError::invalid_param(
                "density",
                format!("must be within [0, 1], got {density}"),
            ));
        }
        Ok(Self {
            density,
            iterations: param_usize(params, "iterations", DEFAULT_ITERATIONS),
        })
    }
}

/// A live automaton: the current generation plus its fixed rule table.
#[derive(Debug, Clone)]
pub struct Automaton {
    grid: Grid<bool>,
    rule: RuleTable,
}

impl Automaton {
    /// Draws a random initial grid and rule table from `rng`.
    ///
    /// Returns `ProcgenError::InvalidDimensions` if either dimension is zero.
    pub fn random(
        width: usize,
        height: usize,
        density: f64,
        rng: &mut RandomStream,
    ) -> Result<Self, ProcgenError> {
        let grid = Grid::from_fn(width, height, |_, _| rng.next_f64() < density)?;
        let mut rule = [false; RULE_SIZE];
        for entry in rule.iter_mut() {
            *entry = rng.next_f64() > RULE_THRESHOLD;
        }
        Ok(Self { grid, rule })
    }

    /// Builds an automaton from an explicit grid and rule table.
    pub fn with_rule(grid: Grid<bool>, rule: RuleTable) -> Self {
        Self { grid, rule }
    }

    /// The current generation.
    pub fn grid(&self) -> &Grid<bool> {
        &self.grid
    }

    pub fn rule(&self) -> &RuleTable {
        &self.rule
    }

    /// Packs the toroidal 3×3 neighborhood of `(x, y)` into a 9-bit key.
    pub fn neighborhood_key(&self, x: usize, y: usize) -> usize {
        let (x, y) = (x as isize, y as isize);
        let mut key = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                key = (key << 1) | usize::from(*self.grid.get_wrapped(x + dx, y + dy));
            }
        }
        key
    }

    /// Advances one generation. Every key is read from the old grid before
    /// the new one replaces it.
    pub fn step(&mut self) {
        let next = self
            .grid
            .map(|_, x, y| self.rule[self.neighborhood_key(x, y)]);
        self.grid = next;
    }

    /// Number of live cells in the current generation.
    pub fn population(&self) -> usize {
        self.grid.data().iter().filter(|&&alive| alive).count()
    }

    /// Records `iterations` generations, each captured before its update.
    ///
    /// Zero iterations still yields the initial grid, so the result is never
    /// empty.
    pub fn history(&mut self, iterations: usize) -> Vec<Grid<bool>> {
        if iterations == 0 {
            return vec![self.grid.clone()];
        }
        let mut generations = Vec::with_capacity(iterations);
        for _ in 0..iterations {
            generations.push(self.grid.clone());
            self.step();
        }
        generations
    }
}

/// Cellular automaton generator producing a list of generations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellularAutomaton {
    pub width: usize,
    pub height: usize,
    pub params: AutomatonParams,
}

impl CellularAutomaton {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            params: AutomatonParams::default(),
        }
    }

    /// Sets the number of recorded generations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.params.iterations = iterations;
        self
    }

    /// Creates an automaton generator from a JSON params object.
    pub fn from_json(width: usize, height: usize, params: &Value) -> Result<Self, ProcgenError> {
        Ok(Self {
            width,
            height,
            params: AutomatonParams::from_json(params)?,
        })
    }
}

impl Generator for CellularAutomaton {
    type Output = Vec<Grid<bool>>;

    fn generate(&self, rng: &mut RandomStream) -> Result<Vec<Grid<bool>>, ProcgenError> {
        let mut automaton = Automaton::random(self.width, self.height, self.params.density, rng)?;
        let initial = automaton.population();
        let generations = automaton.history(self.params.iterations);
        tracing::debug!(
            width = self.width,
            height = self.height,
            generations = generations.len(),
            initial_live = initial,
            final_live = automaton.population(),
            "ran cellular automaton"
        );
        Ok(generations)
    }

    fn params(&self) -> Value {
        json!({
            "density": self.params.density,
            "iterations": self.params.iterations,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "density": {
                "type": "number",
                "default": DEFAULT_DENSITY,
                "min": 0.0,
                "max": 1.0,
                "description": "Probability that a cell starts alive"
            },
            "iterations": {
                "type": "integer",
                "default": DEFAULT_ITERATIONS,
                "min": 0,
                "max": 10000,
                "description": "Generations to record; 0 records only the initial grid"
            }
        })
    }
}
