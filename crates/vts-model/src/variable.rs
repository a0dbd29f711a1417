//! Design variables.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A raw per-mode value exactly as the host API reports it.
///
/// Colors arrive as `{r, g, b, a}` objects, aliases as
/// `{type: "VARIABLE_ALIAS", id}`, everything else as JSON primitives.
pub type RawValue = serde_json::Value;

/// The host's resolved type for a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolvedType {
    /// RGBA color.
    Color,
    /// Floating point number.
    Float,
    /// Text.
    String,
    /// Boolean flag.
    Boolean,
    /// A type this crate does not know about.
    #[serde(other)]
    Unknown,
}

impl ResolvedType {
    /// Host API spelling of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Color => "COLOR",
            Self::Float => "FLOAT",
            Self::String => "STRING",
            Self::Boolean => "BOOLEAN",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A design variable belonging to exactly one collection.
///
/// `values_by_mode` is keyed by mode id. Keys that do not belong to the
/// owning collection's mode list are ignored by the builders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    /// Host-assigned variable identifier.
    pub id: String,
    /// Display name, may contain `/` group separators or `.` path separators.
    pub name: String,
    /// Owning collection id.
    pub variable_collection_id: String,
    /// Resolved type.
    pub resolved_type: ResolvedType,
    /// Raw value per mode id.
    #[serde(default)]
    pub values_by_mode: BTreeMap<String, RawValue>,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Scopes the variable may be applied to.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Platform code syntax snippets (platform name -> snippet).
    #[serde(default)]
    pub code_syntax: BTreeMap<String, String>,
    /// Whether the variable is hidden when publishing a library.
    #[serde(default)]
    pub hidden_from_publishing: bool,
}

impl Variable {
    /// Creates a variable with no values.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        collection_id: impl Into<String>,
        resolved_type: ResolvedType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            variable_collection_id: collection_id.into(),
            resolved_type,
            values_by_mode: BTreeMap::new(),
            description: String::new(),
            scopes: Vec::new(),
            code_syntax: BTreeMap::new(),
            hidden_from_publishing: false,
        }
    }

    /// Sets the raw value for one mode.
    #[must_use]
    pub fn with_value(mut self, mode_id: impl Into<String>, value: RawValue) -> Self {
        self.values_by_mode.insert(mode_id.into(), value);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Raw value for a mode, if present.
    #[must_use]
    pub fn value_for_mode(&self, mode_id: &str) -> Option<&RawValue> {
        self.values_by_mode.get(mode_id)
    }
}
