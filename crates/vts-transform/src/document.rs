//! Export documents.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::canonical::to_canonical_string;
use crate::error::Result;

/// Tool version recorded in document metadata.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Extension namespace used in DTCG documents.
pub const FIGMA_EXTENSION: &str = "com.figma";

/// Indentation of committed document text.
pub const DOCUMENT_INDENT: usize = 2;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    /// Design Tokens Community Group format.
    #[default]
    #[serde(rename = "dtcg")]
    Dtcg,
    /// The host's native collection/group hierarchy.
    #[serde(rename = "figma-native")]
    FigmaNative,
}

impl ExportFormat {
    /// Tag written into document metadata.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dtcg => "dtcg",
            Self::FigmaNative => "figma-native",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How documents are split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportType {
    /// Everything in one document.
    #[default]
    SingleFile,
    /// One document per collection.
    PerCollection,
}

impl ExportType {
    /// Tag written into document metadata.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SingleFile => "singleFile",
            Self::PerCollection => "perCollection",
        }
    }
}

impl fmt::Display for ExportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Volatile metadata stamped onto every document of one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMeta {
    /// ISO-8601 export time.
    pub exported_at: String,
    /// Source document display name.
    pub file_name: String,
    /// Exporter version.
    pub tool_version: String,
}

impl DocumentMeta {
    /// Metadata for an export at the given time.
    pub fn new(file_name: impl Into<String>, exported_at: DateTime<Utc>) -> Self {
        Self {
            exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            file_name: file_name.into(),
            tool_version: TOOL_VERSION.to_string(),
        }
    }
}

/// One complete, hashed document ready to be written or committed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    /// Path relative to the export root, e.g. `tokens.json`.
    pub relative_path: String,
    /// Output format.
    pub format: ExportFormat,
    /// Split mode this document was produced under.
    pub export_type: ExportType,
    /// Collection id, for per-collection documents.
    pub collection_id: Option<String>,
    /// Collection name, for per-collection documents.
    pub collection_name: Option<String>,
    /// Number of variables in the document.
    pub variables_count: usize,
    /// Number of collections in the document.
    pub collections_count: usize,
    /// Hash of the payload, excluding volatile metadata.
    pub content_hash: String,
    /// Full document tree, metadata included.
    pub content: Value,
}

impl ExportDocument {
    /// Canonical text of the document, as committed.
    pub fn to_text(&self) -> Result<String> {
        let mut text = to_canonical_string(&self.content, DOCUMENT_INDENT)?;
        text.push('\n');
        Ok(text)
    }
}

/// Reads the content hash embedded in document text of either format.
///
/// Native documents carry it at the root (`contentHash`), DTCG documents in
/// `$extensions."com.figma".contentHash`. Returns `None` for text that is
/// not JSON or has no hash.
#[must_use]
pub fn extract_content_hash(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;
    value
        .get("contentHash")
        .or_else(|| value.get("$extensions")?.get(FIGMA_EXTENSION)?.get("contentHash"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_meta_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        let meta = DocumentMeta::new("Design System", at);
        assert_eq!(meta.exported_at, "2026-03-01T12:30:00.000Z");
        assert_eq!(meta.tool_version, TOOL_VERSION);
    }

    #[test]
    fn test_extract_content_hash() {
        let native = json!({"contentHash": "abc", "collections": []}).to_string();
        assert_eq!(extract_content_hash(&native).as_deref(), Some("abc"));

        let dtcg = json!({"$extensions": {"com.figma": {"contentHash": "def"}}}).to_string();
        assert_eq!(extract_content_hash(&dtcg).as_deref(), Some("def"));

        assert!(extract_content_hash("{}").is_none());
        assert!(extract_content_hash("not json").is_none());
    }

    #[test]
    fn test_format_tags() {
        assert_eq!(ExportFormat::FigmaNative.to_string(), "figma-native");
        assert_eq!(ExportType::PerCollection.to_string(), "perCollection");
        let parsed: ExportFormat = serde_json::from_str("\"figma-native\"").unwrap();
        assert_eq!(parsed, ExportFormat::FigmaNative);
    }

    #[test]
    fn test_to_text_ends_with_newline() {
        let document = ExportDocument {
            relative_path: "tokens.json".to_string(),
            format: ExportFormat::Dtcg,
            export_type: ExportType::SingleFile,
            collection_id: None,
            collection_name: None,
            variables_count: 0,
            collections_count: 0,
            content_hash: String::new(),
            content: json!({"b": 1, "a": 2}),
        };
        assert_eq!(document.to_text().unwrap(), "{\n  \"a\": 2,\n  \"b\": 1\n}\n");
    }
}
