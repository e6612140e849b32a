#![deny(unsafe_code)]
//! Core types for the procgen toolkit.
//!
//! Provides the seeded [`RandomStream`] every generator draws from, the
//! row-major [`Grid`] container with its shared transforms, the
//! [`Generator`] trait, the reproducible [`Seed`] run description, parameter
//! helpers, HSL palettes, and text entropy/hash utilities.

pub mod error;
pub mod generator;
pub mod grid;
pub mod palette;
pub mod params;
pub mod prng;
pub mod seed;
pub mod text;

pub use error::ProcgenError;
pub use generator::Generator;
pub use grid::Grid;
pub use palette::{build_palette, Hsl, Palette, PaletteGenerator};
pub use prng::{clamp, RandomStream};
pub use seed::Seed;
pub use text::{hash_str, text_entropy};
