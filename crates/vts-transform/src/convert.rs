//! Normalized value to output value conversion.

use std::fmt;

use serde::Serialize;
use serde_json::{Value, json};
use vts_model::ResolvedType;

use crate::canonical::json_number;
use crate::color::{to_dtcg_color, to_native_color};
use crate::error::{Result, TransformError};
use crate::normalize::NormalizedValue;
use crate::resolve::PathMap;

/// Name fragments that mark a numeric variable as a pixel dimension.
///
/// Matched case-insensitively as substrings of the variable name or path.
pub const DIMENSION_KEYWORDS: &[&str] = &[
    "width", "height", "size", "padding", "margin", "spacing", "gap", "radius", "border",
    "offset", "top", "bottom", "left", "right", "inset", "stroke", "corner",
];

/// Unit attached to dimension values.
pub const DIMENSION_UNIT: &str = "px";

/// Whether a numeric variable should be exported as a `px` dimension.
///
/// True only for `FLOAT` variables whose name contains one of
/// [`DIMENSION_KEYWORDS`] or has `x`/`y` as a standalone segment bounded by
/// `-`, `_` or the string ends (`offset-x`, `y_pos`).
#[must_use]
pub fn should_be_dimension(resolved_type: ResolvedType, name_or_path: &str) -> bool {
    if resolved_type != ResolvedType::Float {
        return false;
    }
    let lowered = name_or_path.to_lowercase();
    DIMENSION_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
        || lowered
            .split(['-', '_'])
            .any(|segment| segment == "x" || segment == "y")
}

/// DTCG `$type` values produced by the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DtcgType {
    /// Color token.
    Color,
    /// Pixel dimension.
    Dimension,
    /// Unitless number.
    Number,
    /// Font family name.
    FontFamily,
    /// Plain text.
    String,
    /// Boolean flag.
    Boolean,
}

impl DtcgType {
    /// The `$type` spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Dimension => "dimension",
            Self::Number => "number",
            Self::FontFamily => "fontFamily",
            Self::String => "string",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for DtcgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a host type plus name heuristics to a DTCG `$type`.
#[must_use]
pub fn map_dtcg_type(resolved_type: ResolvedType, name_or_path: &str) -> DtcgType {
    match resolved_type {
        ResolvedType::Color => DtcgType::Color,
        ResolvedType::Float => {
            if should_be_dimension(resolved_type, name_or_path) {
                DtcgType::Dimension
            } else {
                DtcgType::Number
            }
        }
        ResolvedType::String => {
            if name_or_path.to_lowercase().contains("font") {
                DtcgType::FontFamily
            } else {
                DtcgType::String
            }
        }
        ResolvedType::Boolean => DtcgType::Boolean,
        ResolvedType::Unknown => DtcgType::String,
    }
}

/// Curly-brace reference to another token, e.g. `{colors.brand}`.
#[must_use]
pub fn reference(path: &str) -> String {
    format!("{{{path}}}")
}

fn resolve_alias<'a>(paths: &'a PathMap, id: &str) -> Result<&'a str> {
    paths
        .get(id)
        .ok_or_else(|| TransformError::UnresolvedAlias { id: id.to_string() })
}

fn convert_number(value: f64, resolved_type: ResolvedType, name_or_path: &str) -> Value {
    if should_be_dimension(resolved_type, name_or_path) {
        json!({"value": json_number(value), "unit": DIMENSION_UNIT})
    } else {
        json_number(value)
    }
}

/// Converts a normalized value into a DTCG `$value`.
///
/// Aliases become `{path}` references; an alias whose target is not in
/// `paths` fails with [`TransformError::UnresolvedAlias`].
pub fn convert_value(
    value: &NormalizedValue,
    resolved_type: ResolvedType,
    name_or_path: &str,
    paths: &PathMap,
) -> Result<Value> {
    Ok(match value {
        NormalizedValue::Alias(id) => Value::String(reference(resolve_alias(paths, id)?)),
        NormalizedValue::Color(color) => to_dtcg_color(color),
        NormalizedValue::Number(number) => convert_number(*number, resolved_type, name_or_path),
        NormalizedValue::String(text) => Value::String(text.clone()),
        NormalizedValue::Boolean(flag) => Value::Bool(*flag),
    })
}

/// One mode's value in a native document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeModeValue {
    /// Rendered value (colors as CSS strings, aliases as `{path}`).
    pub value: Value,
    /// Id of the referenced variable, for aliases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referenced_variable_id: Option<String>,
    /// Path of the referenced variable, for aliases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referenced_variable_name: Option<String>,
}

impl NativeModeValue {
    /// Converts a normalized value into a native mode entry.
    pub fn convert(
        value: &NormalizedValue,
        resolved_type: ResolvedType,
        name_or_path: &str,
        paths: &PathMap,
    ) -> Result<Self> {
        match value {
            NormalizedValue::Alias(id) => {
                let path = resolve_alias(paths, id)?;
                Ok(Self {
                    value: Value::String(reference(path)),
                    referenced_variable_id: Some(id.clone()),
                    referenced_variable_name: Some(path.to_string()),
                })
            }
            NormalizedValue::Color(color) => Ok(Self::plain(Value::String(to_native_color(color)))),
            other => Ok(Self::plain(convert_value(other, resolved_type, name_or_path, paths)?)),
        }
    }

    fn plain(value: Value) -> Self {
        Self {
            value,
            referenced_variable_id: None,
            referenced_variable_name: None,
        }
    }
}
