#![deny(unsafe_code)]
//! Gradient (Perlin-style) noise over a grid, and flow fields derived from it.
//!
//! The noise lattice is `freq × freq` cells with a random unit gradient at
//! each lattice point. Gradients are drawn lazily from the session stream the
//! first time a lattice point is touched and cached for the rest of that one
//! invocation; the cache is dropped when the invocation returns. The draw
//! order is fixed by the row-major cell walk and the corner order
//! `(x0, y0), (x1, y0), (x0, y1), (x1, y1)`, which keeps runs reproducible.

pub mod flow;

pub use flow::FlowField;

use glam::DVec2;
use procgen_core::error::ProcgenError;
use procgen_core::params::{param_finite_f64, param_positive_usize};
use procgen_core::{Generator, Grid, RandomStream};
use serde_json::{json, Value};
use std::f64::consts::TAU;

/// Default lattice density (cells per axis).
pub const DEFAULT_FREQ: usize = 6;
/// Default amplitude applied before the `[0, 1]` remap.
pub const DEFAULT_AMP: f64 = 1.0;
/// Largest accepted lattice density. The gradient cache holds
/// `(freq + 1)²` entries, so this bounds it at about a million.
pub const MAX_FREQ: usize = 1024;

/// Quintic fade curve `6t^5 - 15t^4 + 10t^3`.
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Gradient noise generator producing a `width × height` scalar grid.
///
/// With `amp = 1` every value lies in `[0, 1]` (the raw signed noise is
/// bounded by `√2 / 2`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientNoise {
    pub width: usize,
    pub height: usize,
    /// Lattice cells per axis. Must be at least 1.
    pub freq: usize,
    /// Scale applied to the signed noise before remapping via `(v + 1) / 2`.
    pub amp: f64,
}

impl GradientNoise {
    /// Creates a noise generator with the default frequency and amplitude.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            freq: DEFAULT_FREQ,
            amp: DEFAULT_AMP,
        }
    }

    /// Sets the lattice density.
    pub fn with_freq(mut self, freq: usize) -> Self {
        self.freq = freq;
        self
    }

    /// Sets the amplitude.
    pub fn with_amp(mut self, amp: f64) -> Self {
        self.amp = amp;
        self
    }

    /// Creates a noise generator from a JSON params object.
    ///
    /// Reads `freq` (integer in `1..=MAX_FREQ`) and `amp` (finite number),
    /// falling back to defaults for missing keys.
    pub fn from_json(width: usize, height: usize, params: &Value) -> Result<Self, ProcgenError> {
        let freq = param_positive_usize(params, "freq", DEFAULT_FREQ)?;
        check_freq(freq)?;
        Ok(Self {
            width,
            height,
            freq,
            amp: param_finite_f64(params, "amp", DEFAULT_AMP)?,
        })
    }

    /// Opens a sampler bound to `rng` with a fresh, empty gradient cache.
    pub fn sampler<'a>(&self, rng: &'a mut RandomStream) -> Result<NoiseSampler<'a>, ProcgenError> {
        if self.width == 0 || self.height == 0 {
            return Err(ProcgenError::InvalidDimensions);
        }
        check_freq(self.freq)?;
        Ok(NoiseSampler {
            width: self.width,
            height: self.height,
            freq: self.freq,
            amp: self.amp,
            lattice: Lattice::new(self.freq + 1),
            rng,
        })
    }
}

/// Rejects lattice densities outside `1..=MAX_FREQ`.
fn check_freq(freq: usize) -> Result<(), ProcgenError> {
    match freq {
        0 => Err(ProcgenError::invalid_param("freq", "must be at least 1")),
        f if f > MAX_FREQ => Err(ProcgenError::invalid_param(
            "freq",
            format!("must be at most {MAX_FREQ}, got {f}"),
        )),
        _ => Ok(()),
    }
}

impl Generator for GradientNoise {
    type Output = Grid<f64>;

    fn generate(&self, rng: &mut RandomStream) -> Result<Grid<f64>, ProcgenError> {
        let mut sampler = self.sampler(rng)?;
        let grid = Grid::from_fn(self.width, self.height, |x, y| sampler.value_at(x, y))?;
        tracing::debug!(
            width = self.width,
            height = self.height,
            freq = self.freq,
            gradients = sampler.lattice.filled(),
            "generated gradient noise"
        );
        Ok(grid)
    }

    fn params(&self) -> Value {
        json!({
            "freq": self.freq,
            "amp": self.amp,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "freq": {
                "type": "integer",
                "default": DEFAULT_FREQ,
                "min": 1,
                "max": MAX_FREQ,
                "description": "Lattice cells per axis; higher values give finer detail"
            },
            "amp": {
                "type": "number",
                "default": DEFAULT_AMP,
                "min": 0.0,
                "max": 4.0,
                "description": "Scale applied to signed noise before remapping to [0, 1]"
            }
        })
    }
}

/// Per-invocation cache of lattice gradients, indexed directly by
/// `(ix, iy)` on a `size × size` array.
struct Lattice {
    size: usize,
    gradients: Vec<Option<DVec2>>,
}

impl Lattice {
    fn new(size: usize) -> Self {
        Self {
            size,
            gradients: vec![None; size * size],
        }
    }

    fn gradient(&mut self, ix: usize, iy: usize, rng: &mut RandomStream) -> DVec2 {
        *self.gradients[iy * self.size + ix]
            .get_or_insert_with(|| DVec2::from_angle(rng.next_f64() * TAU))
    }

    fn filled(&self) -> usize {
        self.gradients.iter().filter(|g| g.is_some()).count()
    }
}

/// Evaluates gradient noise cell by cell against one lazily built lattice.
///
/// Repeated queries for the same cell return the same value because the
/// lattice gradients are fixed once drawn.
pub struct NoiseSampler<'a> {
    width: usize,
    height: usize,
    freq: usize,
    amp: f64,
    lattice: Lattice,
    rng: &'a mut RandomStream,
}

impl NoiseSampler<'_> {
    /// Noise value at cell `(x, y)`, or `None` outside the grid.
    pub fn sample(&mut self, x: usize, y: usize) -> Option<f64> {
        (x < self.width && y < self.height).then(|| self.value_at(x, y))
    }

    fn value_at(&mut self, x: usize, y: usize) -> f64 {
        let freq = self.freq as f64;
        let fx = x as f64 / self.width as f64 * freq;
        let fy = y as f64 / self.height as f64 * freq;
        let x0 = (fx.floor() as usize).min(self.freq - 1);
        let y0 = (fy.floor() as usize).min(self.freq - 1);
        let (x1, y1) = (x0 + 1, y0 + 1);
        let sx = fade(fx - x0 as f64);
        let sy = fade(fy - y0 as f64);
        let p = DVec2::new(fx, fy);

        let n0 = self.dot(x0, y0, p);
        let n1 = self.dot(x1, y0, p);
        let ix0 = n0 + (n1 - n0) * sx;
        let n2 = self.dot(x0, y1, p);
        let n3 = self.dot(x1, y1, p);
        let ix1 = n2 + (n3 - n2) * sx;
        let v = ix0 + (ix1 - ix0) * sy;

        (v * self.amp + 1.0) / 2.0
    }

    /// Dot product of the lattice gradient at `(ix, iy)` with the offset to `p`.
    fn dot(&mut self, ix: usize, iy: usize, p: DVec2) -> f64 {
        let g = self.lattice.gradient(ix, iy, self.rng);
        g.dot(p - DVec2::new(ix as f64, iy as f64))
    }
}
