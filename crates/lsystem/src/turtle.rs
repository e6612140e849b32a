//! Turtle interpretation of rewritten symbol strings.
//!
//! | Symbol | Action |
//! |--------|--------|
//! | `F`, `G` | move forward by `step` and record the new point |
//! | `+` | turn by `+angle` degrees |
//! | `-` | turn by `-angle` degrees |
//! | `[` | push position and heading |
//! | `]` | pop, lift the pen, and resume from the saved point |
//!
//! Every other symbol is ignored. The turtle starts at the origin facing `+x`.

use glam::DVec2;
use procgen_core::error::ProcgenError;
use serde::Serialize;

/// One drawing instruction in a traced path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathOp {
    /// Extend the current polyline to this point.
    MoveTo(DVec2),
    /// End the current polyline.
    PenUp,
    /// Start a new polyline at a restored branch point.
    Restore(DVec2),
}

/// Traced turtle path as an ordered instruction list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LSystemPath {
    ops: Vec<PathOp>,
}

impl LSystemPath {
    pub fn ops(&self) -> &[PathOp] {
        &self.ops
    }

    /// Every recorded point in order, branch restores included.
    pub fn points(&self) -> Vec<DVec2> {
        self.ops
            .iter()
            .filter_map(|op| match *op {
                PathOp::MoveTo(p) | PathOp::Restore(p) => Some(p),
                PathOp::PenUp => None,
            })
            .collect()
    }

    /// The path split into connected polylines at each pen-up.
    ///
    /// Empty runs (a pen-up immediately followed by another) are skipped.
    pub fn polylines(&self) -> Vec<Vec<DVec2>> {
        let mut lines = Vec::new();
        let mut current = Vec::new();
        for op in &self.ops {
            match *op {
                PathOp::MoveTo(p) | PathOp::Restore(p) => current.push(p),
                PathOp::PenUp => {
                    if !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

/// Turtle configuration: turn angle in degrees and step length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Turtle {
    pub angle: f64,
    pub step: f64,
}

impl Default for Turtle {
    fn default() -> Self {
        Self {
            angle: 60.0,
            step: 1.0,
        }
    }
}

impl Turtle {
    pub fn new(angle: f64, step: f64) -> Self {
        Self { angle, step }
    }

    /// Traces `symbols` into a path.
    ///
    /// Returns `ProcgenError::UnbalancedBracket` for a `]` with nothing to
    /// restore. Brackets left open at the end are fine.
    pub fn trace(&self, symbols: &str) -> Result<LSystemPath, ProcgenError> {
        let turn = self.angle.to_radians();
        let mut position = DVec2::ZERO;
        let mut heading = 0.0_f64;
        let mut stack: Vec<(DVec2, f64)> = Vec::new();
        let mut ops = vec![PathOp::MoveTo(position)];

        for (i, ch) in symbols.chars().enumerate() {
            match ch {
                'F' | 'G' => {
                    position += DVec2::new(heading.cos(), heading.sin()) * self.step;
                    ops.push(PathOp::MoveTo(position));
                }
                '+' => heading += turn,
                '-' => heading -= turn,
                '[' => stack.push((position, heading)),
                ']' => {
                    let (saved, saved_heading) = stack
                        .pop()
                        .ok_or(ProcgenError::UnbalancedBracket { position: i })?;
                    position = saved;
                    heading = saved_heading;
                    ops.push(PathOp::PenUp);
                    ops.push(PathOp::Restore(position));
                }
                _ => {}
            }
        }
        Ok(LSystemPath { ops })
    }
}
