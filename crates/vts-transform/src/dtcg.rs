//! DTCG document builder.
//!
//! Produces one token tree for all collections. Each variable becomes a
//! token at its dot path; the first mode's value is promoted to `$value`
//! and every mode's value is kept under `$extensions."com.figma".modes`,
//! keyed by mode name.
//!
//! The content hash covers the token tree only. The root `$extensions`
//! metadata block (which holds the export time) is attached after hashing.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value, json};
use tracing::{debug, warn};
use vts_model::{Collection, Variable};

use crate::convert::{convert_value, map_dtcg_type};
use crate::document::{DocumentMeta, ExportDocument, ExportFormat, ExportType, FIGMA_EXTENSION};
use crate::error::{Result, TransformError};
use crate::hash::hash_value;
use crate::normalize::normalize;
use crate::path::build_token_path;
use crate::resolve::PathMap;

/// File name of the single DTCG document.
pub const DTCG_FILE_NAME: &str = "tokens.json";

/// Sets `value` at a dot path, creating intermediate objects.
///
/// An intermediate that exists but is not an object is replaced.
pub fn set_nested(tree: &mut Map<String, Value>, path: &str, value: Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return;
    };
    let mut node = tree;
    for segment in segments {
        let entry = node
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        match entry {
            Value::Object(child) => node = child,
            _ => return,
        }
    }
    node.insert(leaf.to_string(), value);
}

/// Root key reserved for document metadata.
const METADATA_KEY: &str = "$extensions";

/// Id of the already placed variable that `path` would overwrite or nest
/// under, if any.
fn occupied_by<'a>(placed: &'a BTreeMap<String, String>, path: &str) -> Option<&'a str> {
    let mut prefix_end = 0;
    for segment in path.split('.') {
        prefix_end += segment.len();
        if let Some(id) = placed.get(&path[..prefix_end]) {
            return Some(id);
        }
        prefix_end += 1;
    }
    let group = format!("{path}.");
    placed
        .range(group.clone()..)
        .next()
        .filter(|(other, _)| other.starts_with(&group))
        .map(|(_, id)| id.as_str())
}

/// Builds the token object for one variable.
fn build_token(
    collection: &Collection,
    variable: &Variable,
    paths: &PathMap,
) -> Result<Value> {
    let first_mode = collection
        .first_mode()
        .ok_or_else(|| TransformError::MissingValue {
            variable: variable.name.clone(),
            mode: "<none>".to_string(),
        })?;
    let first_raw = variable
        .value_for_mode(&first_mode.mode_id)
        .ok_or_else(|| TransformError::MissingValue {
            variable: variable.name.clone(),
            mode: first_mode.name.clone(),
        })?;

    let resolved = variable.resolved_type;
    let value = convert_value(&normalize(first_raw), resolved, &variable.name, paths)?;

    let mut modes = Map::new();
    for mode in &collection.modes {
        if let Some(raw) = variable.value_for_mode(&mode.mode_id) {
            let converted = convert_value(&normalize(raw), resolved, &variable.name, paths)?;
            modes.insert(mode.name.clone(), converted);
        }
    }

    let mut token = Map::new();
    token.insert(
        "$type".to_string(),
        Value::String(map_dtcg_type(resolved, &variable.name).to_string()),
    );
    token.insert("$value".to_string(), value);
    let description = variable.description.trim();
    if !description.is_empty() {
        token.insert("$description".to_string(), Value::String(description.to_string()));
    }
    token.insert(
        "$extensions".to_string(),
        json!({
            FIGMA_EXTENSION: {
                "modes": modes,
                "scopes": variable.scopes,
                "codeSyntax": variable.code_syntax,
                "hiddenFromPublishing": variable.hidden_from_publishing,
            }
        }),
    );
    Ok(Value::Object(token))
}

/// Builds the DTCG document for all collections.
pub fn build_dtcg_document(
    collections: &[Collection],
    variables: &[Variable],
    paths: &PathMap,
    meta: &DocumentMeta,
) -> Result<ExportDocument> {
    let by_id: HashMap<&str, &Collection> =
        collections.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut tree = Map::new();
    let mut placed: BTreeMap<String, String> = BTreeMap::new();
    for variable in variables {
        let Some(collection) = by_id.get(variable.variable_collection_id.as_str()) else {
            warn!(variable = %variable.name, "skipping variable with unknown collection");
            continue;
        };
        let path = build_token_path(&collection.name, &variable.name);
        if path.split('.').next() == Some(METADATA_KEY) {
            warn!(
                variable = %variable.id,
                path = %path,
                "skipping variable whose path is reserved for document metadata"
            );
            continue;
        }
        if let Some(existing) = occupied_by(&placed, &path) {
            warn!(
                variable = %variable.id,
                existing = %existing,
                path = %path,
                "skipping variable whose token path collides with an earlier variable"
            );
            continue;
        }
        let token = build_token(collection, variable, paths)?;
        set_nested(&mut tree, &path, token);
        placed.insert(path, variable.id.clone());
    }
    let variables_count = placed.len();

    let content_hash = hash_value(&Value::Object(tree.clone()))?;
    tree.insert(
        METADATA_KEY.to_string(),
        json!({
            FIGMA_EXTENSION: {
                "exportedAt": meta.exported_at,
                "fileName": meta.file_name,
                "pluginVersion": meta.tool_version,
                "exportFormat": ExportFormat::Dtcg.as_str(),
                "variablesCount": variables_count,
                "collectionsCount": collections.len(),
                "contentHash": content_hash,
            }
        }),
    );

    debug!(variables_count, hash = %content_hash, "built dtcg document");

    Ok(ExportDocument {
        relative_path: DTCG_FILE_NAME.to_string(),
        format: ExportFormat::Dtcg,
        export_type: ExportType::SingleFile,
        collection_id: None,
        collection_name: None,
        variables_count,
        collections_count: collections.len(),
        content_hash,
        content: Value::Object(tree),
    })
}
