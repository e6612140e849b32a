//! Random HSL palettes.
//!
//! Each color draws hue, saturation, and lightness independently from the
//! session stream. Colors render as CSS `hsl(H S% L%)` strings, and can be
//! converted to `#rrggbb` for renderers that want hex.

use crate::error::ProcgenError;
use crate::generator::Generator;
use crate::params::param_positive_usize;
use crate::prng::RandomStream;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;

/// Default number of colors drawn by [`PaletteGenerator`].
pub const DEFAULT_COLORS: usize = 5;

/// Hue range upper bound (exclusive), degrees.
const HUE_SPAN: f64 = 360.0;
/// Saturation is drawn from `[SAT_MIN, SAT_MIN + SAT_SPAN)` percent.
const SAT_MIN: f64 = 40.0;
const SAT_SPAN: f64 = 60.0;
/// Lightness is drawn from `[LIGHT_MIN, LIGHT_MIN + LIGHT_SPAN)` percent.
const LIGHT_MIN: f64 = 20.0;
const LIGHT_SPAN: f64 = 60.0;

/// An HSL color with integer hue (degrees) and integer percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsl {
    pub h: u16,
    pub s: u8,
    pub l: u8,
}

impl Hsl {
    /// Draws one color: hue, then saturation, then lightness.
    pub fn random(rng: &mut RandomStream) -> Self {
        let h = (rng.next_f64() * HUE_SPAN).floor() as u16;
        let s = (SAT_MIN + rng.next_f64() * SAT_SPAN).floor() as u8;
        let l = (LIGHT_MIN + rng.next_f64() * LIGHT_SPAN).floor() as u8;
        Self { h, s, l }
    }

    /// Converts to 8-bit RGB.
    pub fn to_rgb(self) -> [u8; 3] {
        let s = f64::from(self.s.min(100)) / 100.0;
        let l = f64::from(self.l.min(100)) / 100.0;
        let h = f64::from(self.h % 360) / 60.0;

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = l - c / 2.0;
        let (r, g, b) = match h as u8 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let to_byte = |v: f64| ((v + m).clamp(0.0, 1.0) * 255.0).round() as u8;
        [to_byte(r), to_byte(g), to_byte(b)]
    }

    /// Converts to a hex string like `"#rrggbb"`.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({} {}% {}%)", self.h, self.s, self.l)
    }
}

impl Serialize for Hsl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// An ordered list of independently drawn colors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Palette {
    colors: Vec<Hsl>,
}

impl Palette {
    /// Draws `count` colors from `rng`.
    ///
    /// Returns `ProcgenError::EmptyCollection` if `count` is 0.
    pub fn random(count: usize, rng: &mut RandomStream) -> Result<Self, ProcgenError> {
        if count == 0 {
            return Err(ProcgenError::EmptyCollection(
                "palette requires at least 1 color".into(),
            ));
        }
        let colors: Vec<Hsl> = (0..count).map(|_| Hsl::random(rng)).collect();
        tracing::debug!(count, "built palette");
        Ok(Self { colors })
    }

    /// The colors in draw order.
    pub fn colors(&self) -> &[Hsl] {
        &self.colors
    }

    /// Returns the number of colors in this palette.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns true if this palette has no colors. (Always false for valid palettes.)
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The colors as CSS `hsl(...)` strings.
    pub fn to_css(&self) -> Vec<String> {
        self.colors.iter().map(Hsl::to_string).collect()
    }
}

/// Draws `count` HSL color strings from `rng`.
pub fn build_palette(count: usize, rng: &mut RandomStream) -> Result<Vec<String>, ProcgenError> {
    Palette::random(count, rng).map(|p| p.to_css())
}

/// Palette as a registry generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteGenerator {
    pub count: usize,
}

impl Default for PaletteGenerator {
    fn default() -> Self {
        Self {
            count: DEFAULT_COLORS,
        }
    }
}

impl PaletteGenerator {
    /// Reads `count` from a JSON params object; zero is rejected.
    pub fn from_json(params: &Value) -> Result<Self, ProcgenError> {
        Ok(Self {
            count: param_positive_usize(params, "count", DEFAULT_COLORS)?,
        })
    }
}

impl Generator for PaletteGenerator {
    type Output = Palette;

    fn generate(&self, rng: &mut RandomStream) -> Result<Palette, ProcgenError> {
        Palette::random(self.count, rng)
    }

    fn params(&self) -> Value {
        json!({ "count": self.count })
    }

    fn param_schema(&self) -> Value {
        json!({
            "count": {
                "type": "integer",
                "default": DEFAULT_COLORS,
                "min": 1,
                "max": 256,
                "description": "Number of colors to draw"
            }
        })
    }
}
