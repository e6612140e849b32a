//! Helpers for reading generator configuration out of a JSON params object.
//!
//! The lenient helpers (`param_f64`, `param_usize`) fall back
//! to the default when a key is missing or has the wrong type. The checked
//! helpers additionally reject values outside the generator's domain, so a
//! bad config fails before any cell is generated.

use crate::error::ProcgenError;
use serde_json::Value;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
///
/// Accepts both JSON numbers (including integers) and converts them to f64.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing or wrong type.
///
/// Only non-negative integers are accepted; floats and negatives fall back.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Like [`param_usize`] but rejects zero.
pub fn param_positive_usize(
    params: &Value,
    name: &str,
    default: usize,
) -> Result<usize, ProcgenError> {
    match param_usize(params, name, default) {
        0 => Err(ProcgenError::invalid_param(name, "must be at least 1")),
        v => Ok(v),
    }
}

/// Like [`param_f64`] but rejects NaN and infinities.
pub fn param_finite_f64(params: &Value, name: &str, default: f64) -> Result<f64, ProcgenError> {
    let v = param_f64(params, name, default);
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ProcgenError::invalid_param(name, format!("must be finite, got {v}")))
    }
}

/// Human-readable JSON type name, used in type-mismatch errors.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
