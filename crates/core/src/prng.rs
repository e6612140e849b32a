//! Deterministic PRNG shared by every generator in a session.
//!
//! [`RandomStream`] is a 32-bit multiply-xorshift-add generator. It makes no
//! cryptographic claims; its only contract is reproducibility: the same seed
//! always yields the same sequence on every platform (pure wrapping `u32`
//! arithmetic in the core step).
//!
//! Generators never own a hidden stream. Each stochastic call borrows the
//! session's stream mutably, so a single stream cannot be driven by two
//! sessions at once.

use crate::error::ProcgenError;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seeded 32-bit pseudo-random stream producing `f64` values in [0, 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomStream {
    state: u32,
}

impl RandomStream {
    /// Multiplier of the linear-congruential step.
    const MULTIPLIER: u32 = 48_271;
    /// Additive constant applied after the xorshift.
    const INCREMENT: u32 = 0x7fff_ffff;
    /// Constant mixed into clock-derived seeds.
    const CLOCK_MIX: u32 = 0x9E37_79B9;

    /// Creates a stream from an explicit seed.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Creates a stream seeded from the wall clock mixed with a constant.
    ///
    /// Runs seeded this way are not reproducible unless the caller records
    /// [`RandomStream::state`] before drawing.
    pub fn from_clock() -> Self {
        Self::new(clock_seed())
    }

    /// Current internal state. A stream rebuilt with `new(state)` continues
    /// the exact same sequence.
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Advances the state and returns it.
    pub fn next_u32(&mut self) -> u32 {
        let mut s = self.state.wrapping_mul(Self::MULTIPLIER);
        s ^= s >> 13;
        s = s.wrapping_add(Self::INCREMENT);
        self.state = s;
        s
    }

    /// Returns a uniformly distributed f64 in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / 4_294_967_296.0
    }

    /// Returns a uniformly distributed f64 in [min, max).
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Returns a value in [-scale/2, scale/2), i.e. `(next - 0.5) * scale`.
    pub fn next_signed(&mut self, scale: f64) -> f64 {
        (self.next_f64() - 0.5) * scale
    }

    /// Returns a uniformly distributed usize in [0, max) by flooring
    /// `next_f64() * max`.
    ///
    /// # Panics
    ///
    /// Panics if `max` is 0.
    pub fn next_usize(&mut self, max: usize) -> usize {
        assert!(max > 0, "next_usize requires max > 0");
        ((self.next_f64() * max as f64) as usize).min(max - 1)
    }

    /// Returns `true` with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniformly picks one element of `items`.
    ///
    /// Returns `ProcgenError::EmptyCollection` if `items` is empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T, ProcgenError> {
        if items.is_empty() {
            return Err(ProcgenError::EmptyCollection("pick candidates".into()));
        }
        Ok(&items[self.next_usize(items.len())])
    }

    /// Picks one element of `items` with probability proportional to its weight.
    ///
    /// Draws `x = next * sum(weights)` and returns the first item whose
    /// cumulative weight reaches `x`. When the weights sum to a non-positive
    /// or non-finite value, or rounding exhausts the walk, the last item is
    /// returned. No randomness is consumed in the non-positive case.
    ///
    /// Returns `ProcgenError::EmptyCollection` for empty input and
    /// `ProcgenError::InvalidParameter` when the slices differ in length.
    pub fn weighted_pick<'a, T>(
        &mut self,
        items: &'a [T],
        weights: &[f64],
    ) -> Result<&'a T, ProcgenError> {
        if items.is_empty() {
            return Err(ProcgenError::EmptyCollection("weighted pick candidates".into()));
        }
        if weights.len() != items.len() {
            return Err(ProcgenError::invalid_param(
                "weights",
                format!("expected {} weights, got {}", items.len(), weights.len()),
            ));
        }
        let last = &items[items.len() - 1];
        let sum: f64 = weights.iter().sum();
        if !sum.is_finite() || sum <= 0.0 {
            return Ok(last);
        }
        let mut x = self.next_f64() * sum;
        for (item, w) in items.iter().zip(weights) {
            x -= w;
            if x <= 0.0 {
                return Ok(item);
            }
        }
        Ok(last)
    }

    /// Shuffles `items` in place with Fisher-Yates.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_usize(i + 1);
            items.swap(i, j);
        }
    }
}

/// Clamps `v` to `[lo, hi]` as `max(lo, min(hi, v))`.
///
/// Unlike [`f64::clamp`] this never panics when `lo > hi`; `lo` wins.
pub fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    lo.max(hi.min(v))
}

fn clock_seed() -> u32 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    (millis as u32) ^ RandomStream::CLOCK_MIX
}
