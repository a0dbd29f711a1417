//! JSON document snapshots.
//!
//! A snapshot is the host document model captured to a file:
//!
//! ```json
//! {
//!   "name": "Design System",
//!   "collections": [{"id": "c1", "name": "Colors", "modes": [{"modeId": "m1", "name": "Light"}]}],
//!   "variables": [{"id": "v1", "name": "Brand/Primary", "variableCollectionId": "c1",
//!                  "resolvedType": "COLOR", "valuesByMode": {"m1": {"r": 1, "g": 0, "b": 0}}}],
//!   "libraryVariables": []
//! }
//! ```
//!
//! `libraryVariables` holds variables that can be fetched by id but are not
//! part of the local set (variables published from another library).

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::collection::Collection;
use crate::error::{ModelError, Result};
use crate::source::DocumentSource;
use crate::variable::Variable;

/// An in-memory copy of a host document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    /// Document display name.
    pub name: String,
    /// Local collections.
    #[serde(default)]
    pub collections: Vec<Collection>,
    /// Local variables.
    #[serde(default)]
    pub variables: Vec<Variable>,
    /// Variables resolvable by id that are not local.
    #[serde(default)]
    pub library_variables: Vec<Variable>,
}

impl DocumentSnapshot {
    /// Creates an empty snapshot with the given document name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parses a snapshot from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot = Self::from_json_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            collections = snapshot.collections.len(),
            variables = snapshot.variables.len(),
            "loaded document snapshot"
        );
        Ok(snapshot)
    }

    /// Adds a collection.
    #[must_use]
    pub fn with_collection(mut self, collection: Collection) -> Self {
        self.collections.push(collection);
        self
    }

    /// Adds a local variable.
    #[must_use]
    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    /// Adds a library variable (resolvable by id only).
    #[must_use]
    pub fn with_library_variable(mut self, variable: Variable) -> Self {
        self.library_variables.push(variable);
        self
    }
}

#[async_trait]
impl DocumentSource for DocumentSnapshot {
    async fn document_name(&self) -> Result<String> {
        Ok(self.name.clone())
    }

    async fn collections(&self) -> Result<Vec<Collection>> {
        Ok(self.collections.clone())
    }

    async fn variables(&self) -> Result<Vec<Variable>> {
        Ok(self.variables.clone())
    }

    async fn variable_by_id(&self, id: &str) -> Result<Option<Variable>> {
        Ok(self
            .variables
            .iter()
            .chain(self.library_variables.iter())
            .find(|variable| variable.id == id)
            .cloned())
    }
}
