//! Error types for GitHub sync.

use std::path::PathBuf;

use thiserror::Error;
use vts_transform::TransformError;

/// Errors that can occur while syncing documents to GitHub.
///
/// Retry decisions are made on the variant and status code, never on the
/// message text.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The access token cannot be sent as a header.
    #[error("invalid access token: {0}")]
    InvalidToken(String),

    /// The request timed out.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// GitHub answered with an unexpected status.
    #[error("GitHub API error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// A file write kept conflicting after one refetch.
    #[error("write conflict on '{path}' persisted after refetch")]
    Conflict {
        /// Repository path of the file.
        path: String,
    },

    /// File content could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// A response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Json(String),

    /// Local file operation failed.
    #[error("failed to {operation} {path}: {source}")]
    Io {
        /// What was being done.
        operation: &'static str,
        /// File involved.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sync state could not be read or written.
    #[error("sync state error: {0}")]
    State(String),

    /// A document could not be rendered for commit.
    #[error(transparent)]
    Export(#[from] TransformError),
}

impl SyncError {
    /// Whether a failed request is worth another attempt.
    ///
    /// Transport failures, 5xx, 429 and 409 retry. 401, 403, 404 and 422
    /// are caller mistakes and never retry. Other statuses retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => !matches!(status, 401 | 403 | 404 | 422),
            Self::InvalidToken(_)
            | Self::Conflict { .. }
            | Self::Decode(_)
            | Self::Json(_)
            | Self::Io { .. }
            | Self::State(_)
            | Self::Export(_) => false,
        }
    }

    /// HTTP status, when GitHub answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns a user-friendly error message.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Network(_) => "Could not connect to GitHub. Please check your internet connection.",
            Self::InvalidToken(_) => "The access token is malformed.",
            Self::Timeout(_) => "GitHub did not respond in time.",
            Self::Status { status: 401, .. } => "GitHub rejected the access token.",
            Self::Status { status: 403, .. } => "The access token is not allowed to do this.",
            Self::Status { status: 404, .. } => "The repository, branch or file was not found.",
            Self::Status { status: 422, .. } => "GitHub rejected the request as invalid.",
            Self::Status { status: 429, .. } => "GitHub API rate limit reached. Please try again later.",
            Self::Status { .. } => "GitHub returned an error.",
            Self::Conflict { .. } => "Another change was pushed to the same file at the same time.",
            Self::Decode(_) | Self::Json(_) => "GitHub returned data that could not be read.",
            Self::Io { .. } | Self::State(_) => "Could not read or write the local sync state.",
            Self::Export(_) => "The export could not be rendered.",
        }
    }

    /// Suggested next step for the user, when there is one.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidToken(_) | Self::Status { status: 401, .. } => {
                Some("Check the token in VTS_GITHUB_TOKEN or GITHUB_TOKEN, or pass --token.")
            }
            Self::Status { status: 403, .. } => {
                Some("Grant the token contents read and write access to the repository.")
            }
            Self::Status { status: 404, .. } => {
                Some("Check the owner, repo and branch in the [github] settings.")
            }
            Self::Status { status: 422, .. } => {
                Some("Check base_path: it must be a relative folder inside the repository.")
            }
            Self::Conflict { .. } => Some("Run the push again."),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
