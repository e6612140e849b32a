#![deny(unsafe_code)]
//! Particle simulation over a flow field.
//!
//! A constant population of particles is advanced for a fixed number of
//! frames. Each frame records a snapshot of every particle *before* that
//! frame's physics runs, so frame `t` shows the state after `t` updates.
//!
//! Per particle and frame:
//! 1. with probability 0.002, add a random velocity kick;
//! 2. add the flow vector at the particle's clamped cell, scaled by 0.5
//!    (cells outside the field read as the zero vector);
//! 3. integrate position with time step 0.5, then damp velocity by 0.98;
//! 4. decrement the lifetime and wrap the position toroidally;
//! 5. respawn with fresh random state when the lifetime runs out.
//!
//! Every random value, the kick test included, comes from the session's
//! [`RandomStream`], so a fixed seed replays the whole animation
//! bit-identically.

use glam::DVec2;
use procgen_core::error::ProcgenError;
use procgen_core::params::param_positive_usize;
use procgen_core::{clamp, Generator, Grid, RandomStream};
use procgen_noise::{FlowField, MAX_FREQ};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

/// Default number of recorded frames.
pub const DEFAULT_FRAMES: usize = 120;
/// Default population size.
pub const DEFAULT_COUNT: usize = 200;
/// Default noise lattice density for the generated flow field.
pub const DEFAULT_SCALE: usize = 4;

/// Per-frame probability of a random velocity kick.
const KICK_PROBABILITY: f64 = 0.002;
/// Kick components are drawn from `[-KICK_STRENGTH/2, KICK_STRENGTH/2)`.
const KICK_STRENGTH: f64 = 4.0;
/// Scale applied to the sampled flow vector before it is added to velocity.
const FIELD_GAIN: f64 = 0.5;
/// Position integration step.
const TIME_STEP: f64 = 0.5;
/// Per-frame velocity damping.
const DAMPING: f64 = 0.98;
/// Lifetimes are drawn from `[LIFE_MIN, LIFE_MIN + LIFE_SPAN)` frames.
const LIFE_MIN: f64 = 30.0;
const LIFE_SPAN: f64 = 600.0;
/// Spawn velocity components are drawn from `[-SPAWN_SPEED/2, SPAWN_SPEED/2)`.
const SPAWN_SPEED: f64 = 2.0;
/// Sizes are drawn from `[SIZE_MIN, SIZE_MIN + SIZE_SPAN)`.
const SIZE_MIN: f64 = 0.5;
const SIZE_SPAN: f64 = 3.0;
/// Color channels are `floor(next * COLOR_SPAN)`.
const COLOR_SPAN: f64 = 255.0;
/// Range of the random tag in a particle id.
const ID_TAG_SPAN: f64 = 1e9;

/// Opaque particle identity: spawn index plus a random tag.
///
/// Displays as `<index>-<tag>` in base 36.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleId {
    index: usize,
    tag: u32,
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", base36(self.index as u64), base36(u64::from(self.tag)))
    }
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();
    loop {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// A live particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: ParticleId,
    pub position: DVec2,
    pub velocity: DVec2,
    /// Remaining lifetime in frames. Always at least 1 between frames.
    pub life: u32,
    pub color: [u8; 3],
    pub size: f64,
}

fn draw_life(rng: &mut RandomStream) -> u32 {
    (LIFE_MIN + rng.next_f64() * LIFE_SPAN).floor() as u32
}

fn draw_color(rng: &mut RandomStream) -> [u8; 3] {
    let mut channel = || (rng.next_f64() * COLOR_SPAN).floor() as u8;
    [channel(), channel(), channel()]
}

fn draw_velocity(rng: &mut RandomStream) -> DVec2 {
    let vx = rng.next_signed(SPAWN_SPEED);
    let vy = rng.next_signed(SPAWN_SPEED);
    DVec2::new(vx, vy)
}

impl Particle {
    /// Spawns particle `index` inside `bounds`.
    ///
    /// Draw order: id tag, x, y, vx, vy, lifetime, r, g, b, size.
    fn spawn(index: usize, bounds: DVec2, rng: &mut RandomStream) -> Self {
        let tag = (rng.next_f64() * ID_TAG_SPAN).floor() as u32;
        let x = rng.next_f64() * bounds.x;
        let y = rng.next_f64() * bounds.y;
        let velocity = draw_velocity(rng);
        let life = draw_life(rng);
        let color = draw_color(rng);
        let size = SIZE_MIN + rng.next_f64() * SIZE_SPAN;
        Self {
            id: ParticleId { index, tag },
            position: DVec2::new(x, y),
            velocity,
            life,
            color,
            size,
        }
    }

    /// Replaces everything except the id.
    ///
    /// Draw order: x, y, lifetime, vx, vy, r, g, b, size.
    fn respawn(&mut self, bounds: DVec2, rng: &mut RandomStream) {
        let x = rng.next_f64() * bounds.x;
        let y = rng.next_f64() * bounds.y;
        self.position = DVec2::new(x, y);
        self.life = draw_life(rng);
        self.velocity = draw_velocity(rng);
        self.color = draw_color(rng);
        self.size = SIZE_MIN + rng.next_f64() * SIZE_SPAN;
    }

    fn snapshot(&self) -> ParticleSnapshot {
        ParticleSnapshot {
            x: self.position.x,
            y: self.position.y,
            size: self.size,
            color: self.color,
        }
    }
}

/// What a renderer needs to draw one particle in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticleSnapshot {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: [u8; 3],
}

/// Wraps `v` into `[0, size)`.
fn wrap(v: f64, size: f64) -> f64 {
    let mut v = v;
    if v < 0.0 {
        v = size + v % size;
    }
    if v >= size {
        v %= size;
    }
    v
}

/// Flow vector at the cell under `p`, clamped into the field; anything the
/// clamp cannot reach reads as zero.
fn sample_field(field: &Grid<DVec2>, p: DVec2) -> DVec2 {
    let fx = clamp(p.x.floor(), 0.0, (field.width() - 1) as f64) as usize;
    let fy = clamp(p.y.floor(), 0.0, (field.height() - 1) as f64) as usize;
    field.get(fx, fy).copied().unwrap_or(DVec2::ZERO)
}

/// A population advancing through a shared, read-only flow field.
pub struct ParticleSystem<'f> {
    bounds: DVec2,
    field: &'f Grid<DVec2>,
    particles: Vec<Particle>,
}

impl<'f> ParticleSystem<'f> {
    /// Spawns `count` particles uniformly inside `width × height`.
    ///
    /// Returns `ProcgenError::InvalidDimensions` for a zero-sized area and
    /// `ProcgenError::InvalidParameter` for an empty population.
    pub fn spawn(
        width: usize,
        height: usize,
        count: usize,
        field: &'f Grid<DVec2>,
        rng: &mut RandomStream,
    ) -> Result<Self, ProcgenError> {
        if width == 0 || height == 0 {
            return Err(ProcgenError::InvalidDimensions);
        }
        if count == 0 {
            return Err(ProcgenError::invalid_param("count", "must be at least 1"));
        }
        let bounds = DVec2::new(width as f64, height as f64);
        let particles = (0..count)
            .map(|i| Particle::spawn(i, bounds, rng))
            .collect();
        Ok(Self {
            bounds,
            field,
            particles,
        })
    }

    /// The live particles in spawn order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Snapshot of every particle, in spawn order.
    pub fn snapshot(&self) -> Vec<ParticleSnapshot> {
        self.particles.iter().map(Particle::snapshot).collect()
    }

    /// Runs one frame of physics. Returns how many particles respawned.
    pub fn advance(&mut self, rng: &mut RandomStream) -> usize {
        let (bounds, field) = (self.bounds, self.field);
        let mut respawned = 0;
        for p in &mut self.particles {
            if rng.chance(KICK_PROBABILITY) {
                p.velocity.x += rng.next_signed(KICK_STRENGTH);
                p.velocity.y += rng.next_signed(KICK_STRENGTH);
            }
            p.velocity += sample_field(field, p.position) * FIELD_GAIN;
            p.position += p.velocity * TIME_STEP;
            p.velocity *= DAMPING;
            p.life = p.life.saturating_sub(1);
            p.position = DVec2::new(wrap(p.position.x, bounds.x), wrap(p.position.y, bounds.y));
            if p.life == 0 {
                p.respawn(bounds, rng);
                respawned += 1;
            }
        }
        respawned
    }

    /// Records `frames` snapshots, advancing after each one.
    pub fn record(mut self, frames: usize, rng: &mut RandomStream) -> Simulation {
        let mut recorded = Vec::with_capacity(frames);
        let mut respawns = 0;
        for _ in 0..frames {
            recorded.push(self.snapshot());
            respawns += self.advance(rng);
        }
        tracing::debug!(
            particles = self.particles.len(),
            frames,
            respawns,
            "recorded particle simulation"
        );
        Simulation { frames: recorded }
    }
}

/// Precomputed animation: one snapshot array per frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Simulation {
    frames: Vec<Vec<ParticleSnapshot>>,
}

impl Simulation {
    pub fn frames(&self) -> &[Vec<ParticleSnapshot>] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Particle simulation generator: builds a flow field from noise, spawns
/// the population, and records the animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSim {
    pub width: usize,
    pub height: usize,
    pub count: usize,
    pub frames: usize,
    /// Noise lattice density of the generated flow field.
    pub scale: usize,
}

impl ParticleSim {
    pub fn new(width: usize, height: usize, count: usize) -> Self {
        Self {
            width,
            height,
            count,
            frames: DEFAULT_FRAMES,
            scale: DEFAULT_SCALE,
        }
    }

    /// Sets the number of recorded frames.
    pub fn with_frames(mut self, frames: usize) -> Self {
        self.frames = frames;
        self
    }

    /// Sets the flow field lattice density.
    pub fn with_scale(mut self, scale: usize) -> Self {
        self.scale = scale;
        self
    }

    /// Creates a simulation from a JSON params object (`count`, `frames`, `scale`).
    pub fn from_json(width: usize, height: usize, params: &Value) -> Result<Self, ProcgenError> {
        Ok(Self {
            width,
            height,
            count: param_positive_usize(params, "count", DEFAULT_COUNT)?,
            frames: param_positive_usize(params, "frames", DEFAULT_FRAMES)?,
            scale: param_positive_usize(params, "scale", DEFAULT_SCALE)?,
        })
    }

    /// Runs the simulation over a caller-supplied field.
    pub fn simulate(
        &self,
        field: &Grid<DVec2>,
        rng: &mut RandomStream,
    ) -> Result<Simulation, ProcgenError> {
        let system = ParticleSystem::spawn(self.width, self.height, self.count, field, rng)?;
        Ok(system.record(self.frames, rng))
    }
}

impl Generator for ParticleSim {
    type Output = Simulation;

    fn generate(&self, rng: &mut RandomStream) -> Result<Simulation, ProcgenError> {
        let field = FlowField::new(self.width, self.height, self.scale).generate(rng)?;
        self.simulate(&field, rng)
    }

    fn params(&self) -> Value {
        json!({
            "count": self.count,
            "frames": self.frames,
            "scale": self.scale,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "count": {
                "type": "integer",
                "default": DEFAULT_COUNT,
                "min": 1,
                "max": 100000,
                "description": "Number of particles; constant for the whole run"
            },
            "frames": {
                "type": "integer",
                "default": DEFAULT_FRAMES,
                "min": 1,
                "max": 10000,
                "description": "Number of recorded frames"
            },
            "scale": {
                "type": "integer",
                "default": DEFAULT_SCALE,
                "min": 1,
                "max": MAX_FREQ,
                "description": "Noise lattice cells per axis for the steering flow field"
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn still_field(width: usize, height: usize) -> Grid<DVec2> {
        Grid::filled(width, height, DVec2::ZERO).unwrap()
    }

    // -- Helpers --

    #[test]
    fn wrap_maps_into_half_open_range() {
        assert_eq!(wrap(-1.0, 10.0), 9.0);
        assert_eq!(wrap(10.0, 10.0), 0.0);
        assert_eq!(wrap(23.5, 10.0), 3.5);
        assert_eq!(wrap(-10.0, 10.0), 0.0);
        assert_eq!(wrap(4.0, 10.0), 4.0);
    }

    #[test]
    fn wrap_never_returns_size_for_tiny_negative() {
        let v = wrap(-1e-18, 10.0);
        assert!((0.0..10.0).contains(&v), "wrapped to {v}");
    }

    #[test]
    fn sample_field_clamps_to_edges() {
        let field = Grid::from_fn(3, 2, |x, y| DVec2::new(x as f64, y as f64)).unwrap();
        assert_eq!(sample_field(&field, DVec2::new(-5.0, -5.0)), DVec2::new(0.0, 0.0));
        assert_eq!(sample_field(&field, DVec2::new(99.0, 99.0)), DVec2::new(2.0, 1.0));
        assert_eq!(sample_field(&field, DVec2::new(1.7, 0.2)), DVec2::new(1.0, 0.0));
    }

    #[test]
    fn particle_id_displays_base36() {
        let id = ParticleId { index: 35, tag: 36 };
        assert_eq!(id.to_string(), "z-10");
        assert_eq!(base36(0), "0");
    }

    // -- Spawning --

    #[test]
    fn spawn_draws_in_documented_ranges() {
        let field = still_field(4, 4);
        let system = ParticleSystem::spawn(50, 30, 300, &field, &mut RandomStream::new(6)).unwrap();
        for p in system.particles() {
            assert!((0.0..50.0).contains(&p.position.x));
            assert!((0.0..30.0).contains(&p.position.y));
            assert!((-1.0..1.0).contains(&p.velocity.x));
            assert!((-1.0..1.0).contains(&p.velocity.y));
            assert!((30..630).contains(&p.life), "life {}", p.life);
            assert!(p.color.iter().all(|&c| c < 255));
            assert!((0.5..3.5).contains(&p.size));
        }
    }

    #[test]
    fn spawn_assigns_distinct_ids() {
        let field = still_field(4, 4);
        let system = ParticleSystem::spawn(10, 10, 64, &field, &mut RandomStream::new(6)).unwrap();
        let ids: std::collections::HashSet<ParticleId> =
            system.particles().iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), 64);
    }

    #[test]
    fn spawn_rejects_empty_population_and_area() {
        let field = still_field(4, 4);
        let mut rng = RandomStream::new(1);
        assert!(ParticleSystem::spawn(10, 10, 0, &field, &mut rng).is_err());
        assert!(matches!(
            ParticleSystem::spawn(0, 10, 5, &field, &mut rng),
            Err(ProcgenError::InvalidDimensions)
        ));
    }

    // -- Frame physics --

    #[test]
    fn lifetime_decreases_by_one_until_respawn() {
        let field = still_field(8, 8);
        let mut rng = RandomStream::new(13);
        let mut system = ParticleSystem::spawn(8, 8, 100, &field, &mut rng).unwrap();
        for _ in 0..700 {
            let before: Vec<(ParticleId, u32)> =
                system.particles().iter().map(|p| (p.id, p.life)).collect();
            system.advance(&mut rng);
            for ((id, life), p) in before.iter().zip(system.particles()) {
                assert_eq!(*id, p.id, "particle order or identity changed");
                if *life > 1 {
                    assert_eq!(p.life, life - 1);
                } else {
                    assert!(p.life >= 30, "respawned life {}", p.life);
                }
            }
        }
    }

    #[test]
    fn field_steers_velocity() {
        // Uniform +x flow accelerates every particle toward +x.
        let field = Grid::filled(16, 16, DVec2::X).unwrap();
        let mut rng = RandomStream::new(2);
        let mut system = ParticleSystem::spawn(16, 16, 20, &field, &mut rng).unwrap();
        for _ in 0..20 {
            system.advance(&mut rng);
        }
        let mean_vx: f64 =
            system.particles().iter().map(|p| p.velocity.x).sum::<f64>() / 20.0;
        assert!(mean_vx > 1.0, "mean vx {mean_vx}");
    }

    #[test]
    fn smaller_field_than_area_still_samples_edge_cells() {
        let field = Grid::filled(2, 2, DVec2::Y).unwrap();
        let mut rng = RandomStream::new(3);
        let mut system = ParticleSystem::spawn(100, 100, 10, &field, &mut rng).unwrap();
        system.advance(&mut rng);
        assert_eq!(system.particles().len(), 10);
    }

    // -- Recording --

    #[test]
    fn first_frame_is_the_spawn_state() {
        let sim = ParticleSim::new(32, 32, 40).with_frames(5);
        let recorded = sim.generate(&mut RandomStream::new(77)).unwrap();

        let mut rng = RandomStream::new(77);
        let field = FlowField::new(32, 32, sim.scale).generate(&mut rng).unwrap();
        let system = ParticleSystem::spawn(32, 32, 40, &field, &mut rng).unwrap();
        assert_eq!(recorded.frames()[0], system.snapshot());
    }

    #[test]
    fn default_run_records_120_frames_of_constant_population() {
        let sim = ParticleSim::new(24, 24, 30);
        let recorded = sim.generate(&mut RandomStream::new(8)).unwrap();
        assert_eq!(recorded.len(), 120);
        assert!(recorded.frames().iter().all(|f| f.len() == 30));
    }

    #[test]
    fn same_seed_reproduces_every_frame() {
        let sim = ParticleSim::new(40, 20, 50).with_frames(60);
        let a = sim.generate(&mut RandomStream::new(4242)).unwrap();
        let b = sim.generate(&mut RandomStream::new(4242)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn from_json_reads_counts() {
        let sim = ParticleSim::from_json(10, 10, &json!({"count": 5, "frames": 7})).unwrap();
        assert_eq!(sim.count, 5);
        assert_eq!(sim.frames, 7);
        assert_eq!(sim.scale, DEFAULT_SCALE);
        assert!(ParticleSim::from_json(10, 10, &json!({"count": 0})).is_err());
    }

    #[test]
    fn snapshots_serialize_with_named_fields() {
        let snap = ParticleSnapshot {
            x: 1.0,
            y: 2.0,
            size: 0.5,
            color: [1, 2, 3],
        };
        let v = serde_json::to_value(snap).unwrap();
        assert_eq!(v, json!({"x": 1.0, "y": 2.0, "size": 0.5, "color": [1, 2, 3]}));
    }

    // -- Property-based tests --

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn positions_stay_inside_area_every_frame(
                seed: u32,
                w in 1_usize..64,
                h in 1_usize..64,
                count in 1_usize..40,
            ) {
                let sim = ParticleSim::new(w, h, count).with_frames(120);
                let recorded = sim.generate(&mut RandomStream::new(seed)).unwrap();
                for (t, frame) in recorded.frames().iter().enumerate() {
                    prop_assert_eq!(frame.len(), count);
                    for s in frame {
                        prop_assert!(
                            s.x >= 0.0 && s.x < w as f64 && s.y >= 0.0 && s.y < h as f64,
                            "frame {} escaped: ({}, {})", t, s.x, s.y
                        );
                    }
                }
            }
        }
    }
}
