//! Error types for the data model.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or querying a document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// Snapshot file could not be read.
    #[error("failed to read document snapshot: {path}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot content is not valid JSON for the expected shape.
    #[error("invalid document snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// The host document model failed to answer a query.
    #[error("document source error: {0}")]
    Source(String),
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
