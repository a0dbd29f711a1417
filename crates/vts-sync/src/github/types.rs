//! GitHub API types.

use serde::Deserialize;

/// Authenticated user, from `GET /user`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    /// Login name.
    pub login: String,
}

/// Repository metadata, from `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepository {
    /// Name of the default branch.
    pub default_branch: String,
    /// `owner/repo`.
    #[serde(default)]
    pub full_name: Option<String>,
}

/// A git reference, from the refs endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct GitRef {
    /// Full reference name, e.g. `refs/heads/main`.
    #[serde(rename = "ref")]
    pub name: String,
    /// Object the reference points at.
    pub object: GitObject,
}

/// Object a reference points at.
#[derive(Debug, Clone, Deserialize)]
pub struct GitObject {
    /// Commit SHA.
    pub sha: String,
}

/// File as returned by the contents endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFile {
    /// Blob SHA, needed to update the file.
    pub sha: String,
    /// Base64 content, wrapped at 60 columns.
    #[serde(default)]
    pub content: String,
    /// Web URL of the file.
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Response to a contents PUT.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentUpdate {
    /// Written file.
    #[serde(default)]
    pub content: Option<ContentInfo>,
    /// Commit created by the write.
    pub commit: CommitInfo,
}

impl ContentUpdate {
    /// Web URL of the file, falling back to the commit.
    #[must_use]
    pub fn url(&self) -> Option<String> {
        self.content
            .as_ref()
            .and_then(|content| content.html_url.clone())
            .or_else(|| self.commit.html_url.clone())
    }
}

/// File part of a contents PUT response.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentInfo {
    /// New blob SHA.
    pub sha: String,
    /// Web URL of the file.
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Commit part of a contents PUT response.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitInfo {
    /// Commit SHA.
    pub sha: String,
    /// Web URL of the commit.
    #[serde(default)]
    pub html_url: Option<String>,
}

/// An existing file with its content decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingFile {
    /// Blob SHA.
    pub sha: String,
    /// Decoded text.
    pub content: String,
    /// Web URL of the file.
    pub url: Option<String>,
}

/// A file to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Repository path.
    pub path: String,
    /// Full text to commit.
    pub content: String,
    /// Content hash embedded in `content`.
    pub content_hash: String,
}

/// Result of writing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The file already held this content; nothing was written.
    Skipped { url: Option<String> },
    /// The file was written.
    Written { url: Option<String> },
}

impl UpsertOutcome {
    /// Web URL of the file.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Skipped { url } | Self::Written { url } => url.as_deref(),
        }
    }
}

/// Result of a multi-file commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitResult {
    /// True when no file needed writing.
    pub skipped: bool,
    /// URL of the last written file, or of the first skipped one.
    pub url: Option<String>,
    /// Paths that were written.
    pub written: Vec<String>,
    /// Paths that already matched.
    pub skipped_files: Vec<String>,
}
