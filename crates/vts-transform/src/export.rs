//! Export orchestration.
//!
//! Reads the document source, builds the path map, runs the builder for the
//! selected format and wraps the documents into an [`ExportBundle`]. The
//! bundle shape is the same for every format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{Instrument, info, info_span, warn};
use vts_model::{Collection, DocumentSource, Variable};

use crate::document::{DocumentMeta, ExportDocument, ExportFormat, ExportType};
use crate::dtcg::build_dtcg_document;
use crate::error::{Result, TransformError};
use crate::hash::hash_value;
use crate::native::build_native_documents;
use crate::resolve::{PathStyle, build_path_map};

/// What to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    /// Output format.
    pub format: ExportFormat,
    /// Split mode. DTCG always exports a single file.
    pub export_type: ExportType,
}

impl ExportConfig {
    /// Creates a configuration.
    #[must_use]
    pub const fn new(format: ExportFormat, export_type: ExportType) -> Self {
        Self {
            format,
            export_type,
        }
    }

    /// Split mode actually used: DTCG forces a single file.
    #[must_use]
    pub const fn effective_export_type(&self) -> ExportType {
        match self.format {
            ExportFormat::Dtcg => ExportType::SingleFile,
            ExportFormat::FigmaNative => self.export_type,
        }
    }
}

/// Aggregate information about one export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    /// Output format.
    pub format: ExportFormat,
    /// Split mode used.
    pub export_type: ExportType,
    /// ISO-8601 export time.
    pub exported_at: String,
    /// Source document name.
    pub file_name: String,
    /// Number of documents.
    pub documents_count: usize,
    /// Variables across all documents.
    pub variables_count: usize,
    /// Collections across all documents.
    pub collections_count: usize,
    /// Hash of the path-sorted `{relativePath, documentHash}` list.
    pub bundle_hash: String,
}

/// The result of one export: a summary plus the documents.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportBundle {
    /// Aggregate summary.
    pub summary: ExportSummary,
    /// Documents in build order.
    pub documents: Vec<ExportDocument>,
}

impl ExportBundle {
    /// Looks up a document by relative path.
    #[must_use]
    pub fn document(&self, relative_path: &str) -> Option<&ExportDocument> {
        self.documents
            .iter()
            .find(|document| document.relative_path == relative_path)
    }
}

/// Hash over the documents' paths and hashes, independent of build order.
pub fn bundle_hash(documents: &[ExportDocument]) -> Result<String> {
    let mut entries: Vec<(&str, &str)> = documents
        .iter()
        .map(|document| (document.relative_path.as_str(), document.content_hash.as_str()))
        .collect();
    entries.sort_unstable();
    let list: Vec<Value> = entries
        .into_iter()
        .map(|(path, hash)| json!({"relativePath": path, "documentHash": hash}))
        .collect();
    hash_value(&Value::Array(list))
}

/// Builds the export bundle for the current time.
pub async fn build_export_bundle(
    source: &dyn DocumentSource,
    config: &ExportConfig,
) -> Result<ExportBundle> {
    build_export_bundle_at(source, config, Utc::now()).await
}

/// Builds the export bundle, stamping documents with `exported_at`.
///
/// Any failure is reported as [`TransformError::Build`] carrying the
/// original error.
pub async fn build_export_bundle_at(
    source: &dyn DocumentSource,
    config: &ExportConfig,
    exported_at: DateTime<Utc>,
) -> Result<ExportBundle> {
    build(source, config, exported_at)
        .instrument(info_span!("export", format = %config.format))
        .await
        .map_err(TransformError::wrap)
}

async fn build(
    source: &dyn DocumentSource,
    config: &ExportConfig,
    exported_at: DateTime<Utc>,
) -> Result<ExportBundle> {
    let file_name = source.document_name().await?;
    let collections = source.collections().await?;
    let variables = known_collection_variables(&collections, source.variables().await?);
    let meta = DocumentMeta::new(file_name, exported_at);
    let export_type = config.effective_export_type();

    let documents = match config.format {
        ExportFormat::Dtcg => {
            let paths = build_path_map(source, &collections, &variables, PathStyle::Dtcg).await;
            vec![build_dtcg_document(&collections, &variables, &paths, &meta)?]
        }
        ExportFormat::FigmaNative => {
            let paths = build_path_map(source, &collections, &variables, PathStyle::Native).await;
            build_native_documents(&collections, &variables, &paths, &meta, export_type)?
        }
    };

    let summary = ExportSummary {
        format: config.format,
        export_type,
        exported_at: meta.exported_at.clone(),
        file_name: meta.file_name.clone(),
        documents_count: documents.len(),
        variables_count: documents.iter().map(|d| d.variables_count).sum(),
        collections_count: documents.iter().map(|d| d.collections_count).sum(),
        bundle_hash: bundle_hash(&documents)?,
    };

    info!(
        documents = summary.documents_count,
        variables = summary.variables_count,
        collections = summary.collections_count,
        "export complete"
    );

    Ok(ExportBundle { summary, documents })
}

/// Drops variables whose collection is not in `collections`.
fn known_collection_variables(collections: &[Collection], variables: Vec<Variable>) -> Vec<Variable> {
    variables
        .into_iter()
        .filter(|variable| {
            let known = collections
                .iter()
                .any(|collection| collection.id == variable.variable_collection_id);
            if !known {
                warn!(
                    variable = %variable.name,
                    collection = %variable.variable_collection_id,
                    "skipping variable with unknown collection"
                );
            }
            known
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(path: &str, hash: &str) -> ExportDocument {
        ExportDocument {
            relative_path: path.to_string(),
            format: ExportFormat::FigmaNative,
            export_type: ExportType::PerCollection,
            collection_id: None,
            collection_name: None,
            variables_count: 0,
            collections_count: 1,
            content_hash: hash.to_string(),
            content: Value::Null,
        }
    }

    #[test]
    fn test_dtcg_forces_single_file() {
        let config = ExportConfig::new(ExportFormat::Dtcg, ExportType::PerCollection);
        assert_eq!(config.effective_export_type(), ExportType::SingleFile);
        let config = ExportConfig::new(ExportFormat::FigmaNative, ExportType::PerCollection);
        assert_eq!(config.effective_export_type(), ExportType::PerCollection);
    }

    #[test]
    fn test_bundle_hash_ignores_document_order() {
        let forward = vec![document("a.json", "1"), document("b.json", "2")];
        let backward = vec![document("b.json", "2"), document("a.json", "1")];
        assert_eq!(bundle_hash(&forward).unwrap(), bundle_hash(&backward).unwrap());

        let changed = vec![document("a.json", "1"), document("b.json", "3")];
        assert_ne!(bundle_hash(&forward).unwrap(), bundle_hash(&changed).unwrap());
    }
}
