//! Deterministic JSON serialization.
//!
//! Object keys are sorted lexicographically at every nesting level, array
//! order is preserved, and primitives pass through unchanged. Two values
//! that differ only in key order serialize to identical text.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Number, Value};

use crate::error::Result;

/// Returns a copy of `value` with all object keys sorted.
#[must_use]
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|left, right| left.0.cmp(right.0));
            let mut sorted = Map::new();
            for (key, child) in entries {
                sorted.insert(key.clone(), canonicalize(child));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Renders `value` as canonical JSON text.
///
/// `indent` is the number of spaces per level; `0` renders compact text.
pub fn to_canonical_string(value: &Value, indent: usize) -> Result<String> {
    let canonical = canonicalize(value);
    if indent == 0 {
        return Ok(serde_json::to_string(&canonical)?);
    }

    let indent = " ".repeat(indent);
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    canonical.serialize(&mut serializer)?;
    String::from_utf8(buffer).map_err(|e| crate::TransformError::Serialization(e.to_string()))
}

/// Converts a float to a JSON number, rendering whole values as integers.
///
/// `8.0` becomes `8`, `0.5` stays `0.5`. Non-finite values become `null`.
#[must_use]
pub fn json_number(value: f64) -> Value {
    if !value.is_finite() {
        return Value::Null;
    }
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        #[allow(clippy::cast_possible_truncation)]
        return Value::Number(Number::from(value as i64));
    }
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Formats a float the way [`json_number`] renders it.
#[must_use]
pub fn format_number(value: f64) -> String {
    json_number(value).to_string()
}
