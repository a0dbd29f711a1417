//! Native (host hierarchy) document builder.
//!
//! Variable names are split on `/` into a group chain. Groups are kept in an
//! arena ([`GroupTree`]) so that deduplication by name and alphabetical
//! ordering can be checked on their own. Each collection owns one list of
//! [`NativeVariable`]s; the nested group view and the flat `variables` array
//! both index into that list, so they always render the same entries.
//!
//! The content hash covers the whole document except the `contentHash` and
//! `exportedAt` fields.

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value, json};
use tracing::debug;
use vts_model::{Collection, ResolvedType, Variable};

use crate::convert::NativeModeValue;
use crate::document::{DocumentMeta, ExportDocument, ExportFormat, ExportType};
use crate::error::Result;
use crate::hash::hash_value;
use crate::normalize::normalize;
use crate::path::{NativePath, slugify};
use crate::resolve::PathMap;

/// File name of the single-file native document.
pub const NATIVE_FILE_NAME: &str = "variables.json";

/// Slug used when a collection name slugifies to nothing.
const FALLBACK_SLUG: &str = "collection";

/// One variable as it appears in a native document.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeVariable {
    /// Variable id.
    pub id: String,
    /// Leaf name (last `/` segment).
    pub name: String,
    /// Full path within the collection, e.g. `Brand/Primary`.
    pub path: String,
    /// Host type.
    pub resolved_type: ResolvedType,
    /// Trimmed description, if any.
    pub description: Option<String>,
    /// Scopes.
    pub scopes: Vec<String>,
    /// Code syntax snippets.
    pub code_syntax: BTreeMap<String, String>,
    /// Hidden-from-publishing flag.
    pub hidden_from_publishing: bool,
    /// Converted value per mode id.
    pub value_by_mode: BTreeMap<String, NativeModeValue>,
}

impl NativeVariable {
    /// Converts a host variable, computing every mode value once.
    pub fn build(collection: &Collection, variable: &Variable, paths: &PathMap) -> Result<Self> {
        let native_path = NativePath::parse(&variable.name);
        let mut value_by_mode = BTreeMap::new();
        for mode in &collection.modes {
            if let Some(raw) = variable.value_for_mode(&mode.mode_id) {
                let value = NativeModeValue::convert(
                    &normalize(raw),
                    variable.resolved_type,
                    &variable.name,
                    paths,
                )?;
                value_by_mode.insert(mode.mode_id.clone(), value);
            }
        }
        let description = variable.description.trim();
        Ok(Self {
            id: variable.id.clone(),
            name: native_path.leaf.clone(),
            path: native_path.full_path(),
            resolved_type: variable.resolved_type,
            description: (!description.is_empty()).then(|| description.to_string()),
            scopes: variable.scopes.clone(),
            code_syntax: variable.code_syntax.clone(),
            hidden_from_publishing: variable.hidden_from_publishing,
            value_by_mode,
        })
    }

    /// JSON rendering.
    pub fn to_json(&self) -> Result<Value> {
        let mut object = Map::new();
        object.insert("id".to_string(), json!(self.id));
        object.insert("name".to_string(), json!(self.name));
        object.insert("path".to_string(), json!(self.path));
        object.insert("resolvedType".to_string(), json!(self.resolved_type));
        if let Some(description) = &self.description {
            object.insert("description".to_string(), json!(description));
        }
        object.insert("scopes".to_string(), json!(self.scopes));
        object.insert("codeSyntax".to_string(), json!(self.code_syntax));
        object.insert(
            "hiddenFromPublishing".to_string(),
            json!(self.hidden_from_publishing),
        );
        object.insert(
            "valueByMode".to_string(),
            serde_json::to_value(&self.value_by_mode)?,
        );
        Ok(Value::Object(object))
    }
}

/// A group in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupNode {
    /// Group name (one `/` segment).
    pub name: String,
    /// Collection-qualified path, e.g. `Colors/Brand`.
    pub path: String,
    /// Child group indices.
    pub children: Vec<usize>,
    /// Indices into the collection's variable list.
    pub variables: Vec<usize>,
}

/// Arena of groups for one collection. Index [`GroupTree::ROOT`] is the
/// collection itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTree {
    nodes: Vec<GroupNode>,
}

impl GroupTree {
    /// Index of the root node.
    pub const ROOT: usize = 0;

    /// Creates a tree whose root stands for the named collection.
    pub fn new(collection_name: &str) -> Self {
        Self {
            nodes: vec![GroupNode {
                name: collection_name.to_string(),
                path: collection_name.to_string(),
                children: Vec::new(),
                variables: Vec::new(),
            }],
        }
    }

    /// Node at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` was not returned by this tree.
    #[must_use]
    pub fn node(&self, index: usize) -> &GroupNode {
        &self.nodes[index]
    }

    /// Number of groups, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds only the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Walks (creating as needed) the chain of groups named by `segments`
    /// and returns the deepest one. Existing groups are matched by exact,
    /// case-sensitive name at each level.
    pub fn ensure_chain(&mut self, segments: &[String]) -> usize {
        let mut current = Self::ROOT;
        for segment in segments {
            let existing = self.nodes[current]
                .children
                .iter()
                .copied()
                .find(|&child| self.nodes[child].name == *segment);
            current = match existing {
                Some(child) => child,
                None => {
                    let path = format!("{}/{}", self.nodes[current].path, segment);
                    let index = self.nodes.len();
                    self.nodes.push(GroupNode {
                        name: segment.clone(),
                        path,
                        children: Vec::new(),
                        variables: Vec::new(),
                    });
                    self.nodes[current].children.push(index);
                    index
                }
            };
        }
        current
    }

    /// Attaches a variable index to a group.
    pub fn attach(&mut self, group: usize, variable: usize) {
        self.nodes[group].variables.push(variable);
    }

    /// Sorts child groups by name and variables by name at every level.
    pub fn sort(&mut self, variables: &[NativeVariable]) {
        let names: Vec<String> = self.nodes.iter().map(|node| node.name.clone()).collect();
        for node in &mut self.nodes {
            node.children.sort_by(|&a, &b| names[a].cmp(&names[b]));
            node.variables.sort_by(|&a, &b| {
                variables[a]
                    .name
                    .cmp(&variables[b].name)
                    .then_with(|| variables[a].path.cmp(&variables[b].path))
            });
        }
    }

    fn render(&self, index: usize, variables: &[NativeVariable]) -> Result<Value> {
        let node = &self.nodes[index];
        let groups = node
            .children
            .iter()
            .map(|&child| self.render(child, variables))
            .collect::<Result<Vec<_>>>()?;
        let members = node
            .variables
            .iter()
            .map(|&variable| variables[variable].to_json())
            .collect::<Result<Vec<_>>>()?;
        Ok(json!({
            "name": node.name,
            "path": node.path,
            "groups": groups,
            "variables": members,
        }))
    }
}

/// One collection with its variables and group tree.
#[derive(Debug, Clone)]
pub struct NativeCollection<'a> {
    collection: &'a Collection,
    variables: Vec<NativeVariable>,
    tree: GroupTree,
}

impl<'a> NativeCollection<'a> {
    /// Builds the collection view from the variables that belong to it.
    pub fn build(collection: &'a Collection, variables: &[Variable], paths: &PathMap) -> Result<Self> {
        let mut tree = GroupTree::new(&collection.name);
        let mut native = Vec::new();
        for variable in variables
            .iter()
            .filter(|variable| variable.variable_collection_id == collection.id)
        {
            let groups = NativePath::parse(&variable.name).groups;
            let group = tree.ensure_chain(&groups);
            native.push(NativeVariable::build(collection, variable, paths)?);
            tree.attach(group, native.len() - 1);
        }
        tree.sort(&native);
        Ok(Self {
            collection,
            variables: native,
            tree,
        })
    }

    /// Number of variables.
    #[must_use]
    pub fn variables_count(&self) -> usize {
        self.variables.len()
    }

    /// The group arena.
    #[must_use]
    pub fn tree(&self) -> &GroupTree {
        &self.tree
    }

    /// JSON rendering: nested groups plus a flat list sorted by path.
    pub fn to_json(&self) -> Result<Value> {
        let root = self.tree.node(GroupTree::ROOT);
        let groups = root
            .children
            .iter()
            .map(|&child| self.tree.render(child, &self.variables))
            .collect::<Result<Vec<_>>>()?;

        let mut flat: Vec<usize> = (0..self.variables.len()).collect();
        flat.sort_by(|&a, &b| {
            self.variables[a]
                .path
                .cmp(&self.variables[b].path)
                .then_with(|| self.variables[a].id.cmp(&self.variables[b].id))
        });
        let flat = flat
            .into_iter()
            .map(|index| self.variables[index].to_json())
            .collect::<Result<Vec<_>>>()?;

        Ok(json!({
            "id": self.collection.id,
            "name": self.collection.name,
            "modes": self.collection.modes,
            "groups": groups,
            "variables": flat,
            "collectionVariablesCount": self.variables.len(),
        }))
    }
}

/// Assigns each collection a unique slug file name, in enumeration order.
///
/// Collisions get `-2`, `-3`, ... suffixes.
#[must_use]
pub fn collection_file_names(collections: &[Collection]) -> Vec<String> {
    let mut used = HashSet::new();
    collections
        .iter()
        .map(|collection| {
            let mut base = slugify(&collection.name);
            if base.is_empty() {
                base = FALLBACK_SLUG.to_string();
            }
            let mut candidate = base.clone();
            let mut suffix = 2;
            while used.contains(&candidate) {
                candidate = format!("{base}-{suffix}");
                suffix += 1;
            }
            used.insert(candidate.clone());
            format!("{candidate}.json")
        })
        .collect()
}

fn build_document(
    collections: &[&Collection],
    variables: &[Variable],
    paths: &PathMap,
    meta: &DocumentMeta,
    export_type: ExportType,
    relative_path: String,
) -> Result<ExportDocument> {
    let mut rendered = Vec::with_capacity(collections.len());
    let mut variables_count = 0usize;
    for collection in collections {
        let native = NativeCollection::build(collection, variables, paths)?;
        variables_count += native.variables_count();
        rendered.push(native.to_json()?);
    }

    let single = match (export_type, collections) {
        (ExportType::PerCollection, [collection]) => Some(*collection),
        _ => None,
    };

    let mut document = Map::new();
    document.insert("collectionsCount".to_string(), json!(collections.len()));
    document.insert("variablesCount".to_string(), json!(variables_count));
    document.insert("exportedAt".to_string(), json!(meta.exported_at));
    document.insert("fileName".to_string(), json!(meta.file_name));
    document.insert("pluginVersion".to_string(), json!(meta.tool_version));
    document.insert(
        "exportFormat".to_string(),
        json!(ExportFormat::FigmaNative.as_str()),
    );
    document.insert("exportType".to_string(), json!(export_type.as_str()));
    if let Some(collection) = single {
        document.insert("collectionId".to_string(), json!(collection.id));
        document.insert("collectionName".to_string(), json!(collection.name));
    }
    document.insert("collections".to_string(), Value::Array(rendered));

    let mut hashed = document.clone();
    hashed.remove("exportedAt");
    let content_hash = hash_value(&Value::Object(hashed))?;
    document.insert("contentHash".to_string(), json!(content_hash));

    debug!(
        path = %relative_path,
        variables_count,
        hash = %content_hash,
        "built native document"
    );

    Ok(ExportDocument {
        relative_path,
        format: ExportFormat::FigmaNative,
        export_type,
        collection_id: single.map(|c| c.id.clone()),
        collection_name: single.map(|c| c.name.clone()),
        variables_count,
        collections_count: collections.len(),
        content_hash,
        content: Value::Object(document),
    })
}

/// Builds native documents: one for all collections, or one per collection.
pub fn build_native_documents(
    collections: &[Collection],
    variables: &[Variable],
    paths: &PathMap,
    meta: &DocumentMeta,
    export_type: ExportType,
) -> Result<Vec<ExportDocument>> {
    match export_type {
        ExportType::SingleFile => {
            let all: Vec<&Collection> = collections.iter().collect();
            let document = build_document(
                &all,
                variables,
                paths,
                meta,
                export_type,
                NATIVE_FILE_NAME.to_string(),
            )?;
            Ok(vec![document])
        }
        ExportType::PerCollection => collections
            .iter()
            .zip(collection_file_names(collections))
            .map(|(collection, file_name)| {
                build_document(&[collection], variables, paths, meta, export_type, file_name)
            })
            .collect(),
    }
}
