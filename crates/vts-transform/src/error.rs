//! Error types for the transformation pipeline.

use thiserror::Error;
use vts_model::ModelError;

/// Errors raised while building export documents.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransformError {
    /// An alias points at a variable id that is not in the path map.
    ///
    /// Indicates a resolver bug or a dangling reference. Never defaulted.
    #[error("unresolved alias: no token path for referenced variable {id}")]
    UnresolvedAlias {
        /// The referenced variable id.
        id: String,
    },

    /// A variable has no value for a mode that must be exported.
    #[error("missing value for variable '{variable}' in mode '{mode}'")]
    MissingValue {
        /// Variable name.
        variable: String,
        /// Mode name.
        mode: String,
    },

    /// The document source failed to answer a query.
    #[error(transparent)]
    Source(#[from] ModelError),

    /// A document could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Wrapped build failure surfaced by the export orchestrator.
    #[error("export failed: {message}")]
    Build {
        /// Message of the underlying failure.
        message: String,
        #[source]
        source: Box<TransformError>,
    },
}

impl TransformError {
    /// Wraps an internal failure into the single shape the orchestrator
    /// reports. Already-wrapped errors pass through unchanged.
    #[must_use]
    pub fn wrap(self) -> Self {
        match self {
            Self::Build { .. } => self,
            other => Self::Build {
                message: other.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Returns the innermost error, unwrapping [`TransformError::Build`].
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Build { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for TransformError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for transformation operations.
pub type Result<T> = std::result::Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_keeps_message() {
        let err = TransformError::UnresolvedAlias {
            id: "VariableID:9:9".to_string(),
        }
        .wrap();
        assert!(err.to_string().contains("VariableID:9:9"));
        assert!(matches!(err.root(), TransformError::UnresolvedAlias { .. }));
    }

    #[test]
    fn test_wrap_is_idempotent() {
        let err = TransformError::Serialization("boom".to_string())
            .wrap()
            .wrap();
        let TransformError::Build { source, .. } = &err else {
            panic!("expected Build");
        };
        assert!(matches!(**source, TransformError::Serialization(_)));
    }
}
