//! Alias reference resolution.
//!
//! Builds the variable id -> token path map that alias conversion reads
//! from. Local variables get their path from the path builder; ids that an
//! alias references but that are not local are fetched from the document
//! source one at a time, once per unique id.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};
use vts_model::{Collection, DocumentSource, Variable};

use crate::normalize::normalize;
use crate::path::{NativePath, build_token_path, external_fallback_path, external_token_path};

/// Which path convention the map is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    /// Dot-separated slug paths.
    Dtcg,
    /// Slash-separated display paths qualified by collection name.
    Native,
}

/// Variable id -> token path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMap {
    paths: BTreeMap<String, String>,
}

impl PathMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the path for a variable id.
    pub fn insert(&mut self, id: impl Into<String>, path: impl Into<String>) {
        self.paths.insert(id.into(), path.into());
    }

    /// Path for a variable id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&str> {
        self.paths.get(id).map(String::as_str)
    }
}

/// Path of a local variable in the given style.
#[must_use]
pub fn local_path(style: PathStyle, collection: &Collection, variable: &Variable) -> String {
    match style {
        PathStyle::Dtcg => build_token_path(&collection.name, &variable.name),
        PathStyle::Native => NativePath::parse(&variable.name).qualified(&collection.name),
    }
}

/// Ids referenced by aliases that are not local variables, in first-seen order.
#[must_use]
pub fn external_alias_ids(variables: &[Variable]) -> Vec<String> {
    let local: HashSet<&str> = variables.iter().map(|v| v.id.as_str()).collect();
    let mut seen = HashSet::new();
    let mut external = Vec::new();
    for variable in variables {
        for raw in variable.values_by_mode.values() {
            if let Some(id) = normalize(raw).alias_id()
                && !local.contains(id)
                && seen.insert(id.to_string())
            {
                external.push(id.to_string());
            }
        }
    }
    external
}

/// Builds the path map for `variables`, resolving external references
/// through `source`.
///
/// Variables whose collection is unknown get no entry. A failed or empty
/// fetch never propagates: the id maps to a deterministic fallback path.
pub async fn build_path_map(
    source: &dyn DocumentSource,
    collections: &[Collection],
    variables: &[Variable],
    style: PathStyle,
) -> PathMap {
    let by_id: HashMap<&str, &Collection> =
        collections.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut paths = PathMap::new();
    for variable in variables {
        if let Some(collection) = by_id.get(variable.variable_collection_id.as_str()) {
            paths.insert(variable.id.clone(), local_path(style, collection, variable));
        }
    }

    for id in external_alias_ids(variables) {
        let path = match source.variable_by_id(&id).await {
            Ok(Some(remote)) => {
                debug!(id = %id, name = %remote.name, "resolved library variable");
                match style {
                    PathStyle::Dtcg => external_token_path(&remote.name),
                    PathStyle::Native => remote.name,
                }
            }
            Ok(None) => {
                warn!(id = %id, "referenced variable not found, using fallback path");
                external_fallback_path(&id)
            }
            Err(error) => {
                warn!(id = %id, %error, "failed to fetch referenced variable, using fallback path");
                external_fallback_path(&id)
            }
        };
        paths.insert(id, path);
    }

    debug!(entries = paths.paths.len(), "built token path map");
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vts_model::{Mode, ResolvedType};

    fn alias(id: &str) -> serde_json::Value {
        json!({"type": "VARIABLE_ALIAS", "id": id})
    }

    #[test]
    fn test_external_ids_deduplicated() {
        let variables = vec![
            Variable::new("v1", "a", "c1", ResolvedType::Color)
                .with_value("m1", alias("lib:1"))
                .with_value("m2", alias("lib:1")),
            Variable::new("v2", "b", "c1", ResolvedType::Color).with_value("m1", alias("lib:1")),
            Variable::new("v3", "c", "c1", ResolvedType::Color).with_value("m1", alias("v1")),
            Variable::new("v4", "d", "c1", ResolvedType::Color).with_value("m1", alias("lib:2")),
        ];
        assert_eq!(external_alias_ids(&variables), vec!["lib:1", "lib:2"]);
    }

    #[test]
    fn test_local_path_styles() {
        let collection = Collection::new("c1", "Colors", vec![Mode::new("m1", "Light")]);
        let variable = Variable::new("v1", "Brand/Primary", "c1", ResolvedType::Color);
        assert_eq!(
            local_path(PathStyle::Dtcg, &collection, &variable),
            "colors.brandprimary"
        );
        assert_eq!(
            local_path(PathStyle::Native, &collection, &variable),
            "Colors/Brand/Primary"
        );
    }
}
