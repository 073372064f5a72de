//! Helpers for reading typed parameters out of a `serde_json::Value` object.
//!
//! The lenient helpers (`param_f64`, `param_usize`) fall back to a default
//! when a key is missing or mistyped. The `require_*` variants are used where
//! a caller must know that a value was actually supplied.

use crate::error::EngineError;
use serde_json::Value;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
///
/// Accepts both JSON floats and integers.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing or wrong type.
///
/// Only non-negative integers are accepted.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// Extracts an `f64` from `params[name]`, failing when absent or not a number.
pub fn require_f64(params: &Value, name: &str) -> Result<f64, EngineError> {
    let value = params
        .get(name)
        .ok_or_else(|| EngineError::ParamNotFound(name.to_owned()))?;
    value
        .as_f64()
        .ok_or_else(|| type_mismatch(name, "number", value))
}

/// Extracts a `usize` from `params[name]`, failing when absent or not a non-negative integer.
pub fn require_usize(params: &Value, name: &str) -> Result<usize, EngineError> {
    let value = params
        .get(name)
        .ok_or_else(|| EngineError::ParamNotFound(name.to_owned()))?;
    value
        .as_u64()
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| type_mismatch(name, "non-negative integer", value))
}

fn type_mismatch(name: &str, expected: &str, got: &Value) -> EngineError {
    EngineError::ParamTypeMismatch {
        name: name.to_owned(),
        expected: expected.to_owned(),
        got: json_type_name(got).to_owned(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(n) if n.is_i64() && n.as_i64().is_some_and(|v| v < 0) => "negative integer",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
