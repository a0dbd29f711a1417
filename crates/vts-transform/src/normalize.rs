//! Raw host value normalization.

use serde_json::Value;
use vts_model::RawValue;

use crate::color::Rgba;

/// Host marker for alias values.
pub const VARIABLE_ALIAS: &str = "VARIABLE_ALIAS";

/// A raw host value classified into exactly one shape.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedValue {
    /// RGBA color.
    Color(Rgba),
    /// Text.
    String(String),
    /// Number.
    Number(f64),
    /// Boolean.
    Boolean(bool),
    /// Reference to another variable by id.
    Alias(String),
}

impl NormalizedValue {
    /// The referenced variable id for aliases.
    #[must_use]
    pub fn alias_id(&self) -> Option<&str> {
        match self {
            Self::Alias(id) => Some(id),
            _ => None,
        }
    }
}

/// Classifies a raw host value. Never fails.
///
/// Detection order matters because a value may match more than one shape:
/// alias objects first, then color objects, then primitives. Anything else
/// is rendered to text and tagged as a string.
#[must_use]
pub fn normalize(raw: &RawValue) -> NormalizedValue {
    if let Value::Object(map) = raw {
        if map.get("type").and_then(Value::as_str) == Some(VARIABLE_ALIAS)
            && let Some(id) = map.get("id").and_then(Value::as_str)
        {
            return NormalizedValue::Alias(id.to_string());
        }

        let channel = |key: &str| map.get(key).and_then(Value::as_f64);
        if let (Some(r), Some(g), Some(b)) = (channel("r"), channel("g"), channel("b")) {
            let a = channel("a").unwrap_or(1.0);
            return NormalizedValue::Color(Rgba::new(r, g, b, a));
        }
    }

    match raw {
        Value::String(text) => NormalizedValue::String(text.clone()),
        Value::Number(number) => number
            .as_f64()
            .map_or_else(|| NormalizedValue::String(number.to_string()), NormalizedValue::Number),
        Value::Bool(flag) => NormalizedValue::Boolean(*flag),
        other => NormalizedValue::String(other.to_string()),
    }
}
