//! Variable collections and their modes.

use serde::{Deserialize, Serialize};

/// One mode of a collection (e.g. "Light" or "Dark").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mode {
    /// Host-assigned mode identifier.
    pub mode_id: String,
    /// Display name.
    pub name: String,
}

impl Mode {
    /// Creates a mode.
    pub fn new(mode_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            mode_id: mode_id.into(),
            name: name.into(),
        }
    }
}

/// A named grouping of variables sharing an ordered list of modes.
///
/// The first mode in [`Collection::modes`] is the one promoted to a DTCG
/// token's `$value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Host-assigned collection identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered mode list.
    #[serde(default)]
    pub modes: Vec<Mode>,
}

impl Collection {
    /// Creates a collection with the given modes.
    pub fn new(id: impl Into<String>, name: impl Into<String>, modes: Vec<Mode>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            modes,
        }
    }

    /// Returns the first (default) mode, if the collection has any.
    #[must_use]
    pub fn first_mode(&self) -> Option<&Mode> {
        self.modes.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_deserializes_host_shape() {
        let json = r#"{
            "id": "VariableCollectionId:1:1",
            "name": "Colors",
            "modes": [
                {"modeId": "1:0", "name": "Light"},
                {"modeId": "1:1", "name": "Dark"}
            ]
        }"#;
        let collection: Collection = serde_json::from_str(json).unwrap();
        assert_eq!(collection.name, "Colors");
        assert_eq!(collection.first_mode().unwrap().name, "Light");
        assert_eq!(collection.modes[1].name, "Dark");
        assert!(collection.description.is_none());
    }
}
