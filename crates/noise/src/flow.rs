//! Flow fields: unit vectors whose angles come from gradient noise.

use crate::{GradientNoise, MAX_FREQ};
use glam::DVec2;
use procgen_core::error::ProcgenError;
use procgen_core::params::param_positive_usize;
use procgen_core::{Generator, Grid, RandomStream};
use serde_json::{json, Value};
use std::f64::consts::TAU;

/// Default noise lattice density used for the angle field.
pub const DEFAULT_SCALE: usize = 4;

/// Derives a grid of unit vectors by reading noise values as angles.
///
/// Each cell's noise value `n` maps to the angle `n * 2π` and is stored as
/// `(cos, sin)`. The result is read-only and holds no state beyond the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowField {
    pub width: usize,
    pub height: usize,
    /// Noise lattice cells per axis.
    pub scale: usize,
}

impl FlowField {
    pub fn new(width: usize, height: usize, scale: usize) -> Self {
        Self {
            width,
            height,
            scale,
        }
    }

    /// Creates a flow field generator from a JSON params object (`scale`).
    pub fn from_json(width: usize, height: usize, params: &Value) -> Result<Self, ProcgenError> {
        Ok(Self::new(
            width,
            height,
            param_positive_usize(params, "scale", DEFAULT_SCALE)?,
        ))
    }

    fn noise(&self) -> GradientNoise {
        GradientNoise::new(self.width, self.height)
            .with_freq(self.scale)
            .with_amp(1.0)
    }
}

impl Generator for FlowField {
    type Output = Grid<DVec2>;

    fn generate(&self, rng: &mut RandomStream) -> Result<Grid<DVec2>, ProcgenError> {
        let noise = self.noise().generate(rng)?;
        tracing::debug!(
            width = self.width,
            height = self.height,
            scale = self.scale,
            "derived flow field"
        );
        Ok(noise.map(|&n, _, _| DVec2::from_angle(n * TAU)))
    }

    fn params(&self) -> Value {
        json!({ "scale": self.scale })
    }

    fn param_schema(&self) -> Value {
        json!({
            "scale": {
                "type": "integer",
                "default": DEFAULT_SCALE,
                "min": 1,
                "max": MAX_FREQ,
                "description": "Noise lattice cells per axis; higher values give tighter swirls"
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors_are_unit_length() {
        let field = FlowField::new(24, 16, 3)
            .generate(&mut RandomStream::new(4))
            .unwrap();
        for (x, y, v) in field.iter() {
            assert!(
                (v.length() - 1.0).abs() < 1e-9,
                "vector at ({x}, {y}) has length {}",
                v.length()
            );
        }
    }

    #[test]
    fn angles_follow_noise_values() {
        let noise = GradientNoise::new(10, 10).with_freq(5);
        let values = noise.generate(&mut RandomStream::new(21)).unwrap();
        let field = FlowField::new(10, 10, 5)
            .generate(&mut RandomStream::new(21))
            .unwrap();
        for (x, y, v) in field.iter() {
            let n = values.get(x, y).copied().unwrap();
            let expected = DVec2::new((n * TAU).cos(), (n * TAU).sin());
            assert!((*v - expected).length() < 1e-12, "mismatch at ({x}, {y})");
        }
    }

    #[test]
    fn same_seed_produces_identical_field() {
        let flow = FlowField::new(12, 12, 4);
        let a = flow.generate(&mut RandomStream::new(90)).unwrap();
        let b = flow.generate(&mut RandomStream::new(90)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn from_json_rejects_zero_scale() {
        assert!(FlowField::from_json(8, 8, &json!({"scale": 0})).is_err());
        assert_eq!(FlowField::from_json(8, 8, &json!({})).unwrap().scale, DEFAULT_SCALE);
    }

    #[test]
    fn oversized_scale_is_an_error() {
        let flow = FlowField::from_json(4, 4, &json!({"scale": MAX_FREQ + 1})).unwrap();
        assert!(matches!(
            flow.generate(&mut RandomStream::new(3)),
            Err(ProcgenError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn serializes_vectors_as_pairs() {
        let field = FlowField::new(2, 1, 1)
            .generate(&mut RandomStream::new(1))
            .unwrap();
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0][0].as_array().unwrap().len(), 2);
    }
}
