#![deny(unsafe_code)]
//! L-systems: parallel string rewriting plus a 2D turtle.
//!
//! Each iteration rewrites every symbol of the current string at once.
//! Symbols without a rule pass through unchanged. A symbol may carry several
//! weighted successors; one is chosen per occurrence from the session
//! stream, so stochastic systems stay reproducible. Symbols with a single
//! successor never touch the stream.
//!
//! # Example
//!
//! ```
//! use procgen_core::RandomStream;
//! use procgen_lsystem::{LSystem, Rule, Turtle};
//!
//! let koch = LSystem::new("F").unwrap().with_rule(Rule::simple('F', "F+F--F+F"));
//! let symbols = koch.expand(2, &mut RandomStream::new(1)).unwrap();
//! let path = Turtle::new(60.0, 1.0).trace(&symbols).unwrap();
//! assert_eq!(path.points().len(), 17);
//! ```

pub mod turtle;

pub use turtle::{LSystemPath, PathOp, Turtle};

use procgen_core::error::ProcgenError;
use procgen_core::params::{json_type_name, param_finite_f64, param_usize};
use procgen_core::{Generator, RandomStream};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Default starting string.
pub const DEFAULT_AXIOM: &str = "F";
/// Default rule: the Koch curve.
pub const DEFAULT_RULE: (char, &str) = ('F', "F+F--F+F");
/// Default rewrite iterations.
pub const DEFAULT_ITERATIONS: usize = 3;
/// Expanded strings longer than this are rejected rather than built.
pub const MAX_SYMBOLS: usize = 1 << 22;

/// A production: `predecessor` becomes `successor` with relative `weight`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub predecessor: char,
    pub successor: String,
    /// Relative weight among the rules sharing a predecessor.
    pub weight: f64,
}

impl Rule {
    /// A deterministic rule (weight 1).
    pub fn simple(predecessor: char, successor: &str) -> Self {
        Self::weighted(predecessor, successor, 1.0)
    }

    /// One weighted alternative of a stochastic rule.
    pub fn weighted(predecessor: char, successor: &str, weight: f64) -> Self {
        Self {
            predecessor,
            successor: successor.to_string(),
            weight,
        }
    }
}

/// Successor alternatives for one symbol.
#[derive(Debug, Clone, Default, PartialEq)]
struct Productions {
    successors: Vec<String>,
    weights: Vec<f64>,
}

impl Productions {
    fn choose(&self, rng: &mut RandomStream) -> Result<&str, ProcgenError> {
        if self.successors.len() == 1 {
            return Ok(&self.successors[0]);
        }
        rng.weighted_pick(&self.successors, &self.weights)
            .map(String::as_str)
    }
}

/// An axiom plus its production rules.
#[derive(Debug, Clone, PartialEq)]
pub struct LSystem {
    axiom: String,
    rules: BTreeMap<char, Productions>,
}

impl LSystem {
    /// Creates a system with no rules.
    ///
    /// Returns `ProcgenError::EmptyCollection` for an empty axiom.
    pub fn new(axiom: &str) -> Result<Self, ProcgenError> {
        if axiom.is_empty() {
            return Err(ProcgenError::EmptyCollection("axiom".into()));
        }
        Ok(Self {
            axiom: axiom.to_string(),
            rules: BTreeMap::new(),
        })
    }

    /// Adds a production. Several rules for one symbol form a stochastic
    /// choice weighted by [`Rule::weight`].
    pub fn with_rule(mut self, rule: Rule) -> Self {
        let entry = self.rules.entry(rule.predecessor).or_default();
        entry.successors.push(rule.successor);
        entry.weights.push(rule.weight);
        self
    }

    pub fn axiom(&self) -> &str {
        &self.axiom
    }

    /// Rewrites the axiom `iterations` times.
    ///
    /// Returns `ProcgenError::InvalidParameter` if the string would grow
    /// past [`MAX_SYMBOLS`].
    pub fn expand(&self, iterations: usize, rng: &mut RandomStream) -> Result<String, ProcgenError> {
        let mut current = self.axiom.clone();
        for iteration in 0..iterations {
            let mut next = String::with_capacity(current.len() * 2);
            for ch in current.chars() {
                match self.rules.get(&ch) {
                    Some(productions) => next.push_str(productions.choose(rng)?),
                    None => next.push(ch),
                }
                if next.len() > MAX_SYMBOLS {
                    return Err(ProcgenError::invalid_param(
                        "iterations",
                        format!("expansion exceeds {MAX_SYMBOLS} symbols at iteration {}", iteration + 1),
                    ));
                }
            }
            current = next;
        }
        Ok(current)
    }

    /// Rules as JSON: a string per deterministic symbol, an array of
    /// `{successor, weight}` objects per stochastic one.
    fn rules_json(&self) -> Value {
        let map: Map<String, Value> = self
            .rules
            .iter()
            .map(|(symbol, p)| {
                let value = if p.successors.len() == 1 {
                    json!(p.successors[0])
                } else {
                    p.successors
                        .iter()
                        .zip(&p.weights)
                        .map(|(s, w)| json!({"successor": s, "weight": w}))
                        .collect()
                };
                (symbol.to_string(), value)
            })
            .collect();
        Value::Object(map)
    }

    /// Parses rules from JSON.
    ///
    /// Keys are single symbols. Values are either a successor string or an
    /// array of `{"successor": string, "weight": number}` objects, where
    /// `weight` defaults to 1.
    fn rules_from_json(mut self, rules: &Value) -> Result<Self, ProcgenError> {
        let map = rules.as_object().ok_or_else(|| ProcgenError::ParamTypeMismatch {
            name: "rules".into(),
            expected: "object".into(),
            got: json_type_name(rules).into(),
        })?;
        for (key, value) in map {
            let mut symbols = key.chars();
            let predecessor = match (symbols.next(), symbols.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(ProcgenError::invalid_param(
                        "rules",
                        format!("rule key '{key}' must be exactly one symbol"),
                    ))
                }
            };
            let name = format!("rules.{key}");
            match value {
                Value::String(successor) => {
                    self = self.with_rule(Rule::simple(predecessor, successor));
                }
                Value::Array(alternatives) if !alternatives.is_empty() => {
                    for alternative in alternatives {
                        let successor = alternative
                            .get("successor")
                            .and_then(Value::as_str)
                            .ok_or_else(|| ProcgenError::ParamTypeMismatch {
                                name: format!("{name}.successor"),
                                expected: "string".into(),
                                got: alternative
                                    .get("successor")
                                    .map_or("missing", json_type_name)
                                    .into(),
                            })?;
                        let weight = param_finite_f64(alternative, "weight", 1.0)?;
                        self = self.with_rule(Rule::weighted(predecessor, successor, weight));
                    }
                }
                Value::Array(_) => {
                    return Err(ProcgenError::EmptyCollection(format!("{name} alternatives")));
                }
                other => {
                    return Err(ProcgenError::ParamTypeMismatch {
                        name,
                        expected: "string or array".into(),
                        got: json_type_name(other).into(),
                    })
                }
            }
        }
        Ok(self)
    }
}

/// L-system generator: expands the system, then traces it with a turtle.
#[derive(Debug, Clone, PartialEq)]
pub struct LSystemGenerator {
    pub system: LSystem,
    pub turtle: Turtle,
    pub iterations: usize,
}

impl LSystemGenerator {
    pub fn new(system: LSystem, turtle: Turtle, iterations: usize) -> Self {
        Self {
            system,
            turtle,
            iterations,
        }
    }

    /// Creates a generator from a JSON params object.
    ///
    /// Reads `axiom` (default `"F"`), `rules` (default the Koch rule),
    /// `iterations` (3), `angle` in degrees (60), and `step` (1).
    pub fn from_json(params: &Value) -> Result<Self, ProcgenError> {
        let axiom = match params.get("axiom") {
            None => DEFAULT_AXIOM,
            Some(Value::String(s)) => s.as_str(),
            Some(other) => {
                return Err(ProcgenError::ParamTypeMismatch {
                    name: "axiom".into(),
                    expected: "string".into(),
                    got: json_type_name(other).into(),
                })
            }
        };
        let system = LSystem::new(axiom)?;
        let system = match params.get("rules") {
            Some(rules) => system.rules_from_json(rules)?,
            None => system.with_rule(Rule::simple(DEFAULT_RULE.0, DEFAULT_RULE.1)),
        };
        let defaults = Turtle::default();
        let turtle = Turtle::new(
            param_finite_f64(params, "angle", defaults.angle)?,
            param_finite_f64(params, "step", defaults.step)?,
        );
        let iterations = param_usize(params, "iterations", DEFAULT_ITERATIONS);
        Ok(Self::new(system, turtle, iterations))
    }
}

impl Generator for LSystemGenerator {
    type Output = LSystemPath;

    fn generate(&self, rng: &mut RandomStream) -> Result<LSystemPath, ProcgenError> {
        let symbols = self.system.expand(self.iterations, rng)?;
        let path = self.turtle.trace(&symbols)?;
        tracing::debug!(
            iterations = self.iterations,
            symbols = symbols.len(),
            ops = path.ops().len(),
            "traced l-system"
        );
        Ok(path)
    }

    fn params(&self) -> Value {
        json!({
            "axiom": self.system.axiom(),
            "rules": self.system.rules_json(),
            "iterations": self.iterations,
            "angle": self.turtle.angle,
            "step": self.turtle.step,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "axiom": {
                "type": "string",
                "default": DEFAULT_AXIOM,
                "description": "Starting symbol string; must be non-empty"
            },
            "rules": {
                "type": "object",
                "default": { DEFAULT_RULE.0.to_string(): DEFAULT_RULE.1 },
                "description": "Symbol to successor string, or to an array of {successor, weight} alternatives"
            },
            "iterations": {
                "type": "integer",
                "default": DEFAULT_ITERATIONS,
                "min": 0,
                "max": 12,
                "description": "Rewrite passes applied to the axiom"
            },
            "angle": {
                "type": "number",
                "default": 60.0,
                "min": -360.0,
                "max": 360.0,
                "description": "Turn angle in degrees for '+' and '-'"
            },
            "step": {
                "type": "number",
                "default": 1.0,
                "min": 0.0,
                "max": 100.0,
                "description": "Distance moved by 'F' and 'G'"
            }
        })
    }
}
