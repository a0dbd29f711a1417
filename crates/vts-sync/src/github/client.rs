//! GitHub API client for committing documents.

use serde_json::json;
use tracing::{debug, info, warn};
use vts_transform::extract_content_hash;

use super::types::{
    CommitResult, ContentFile, ContentUpdate, ExistingFile, FileChange, GitHubRepository,
    GitHubUser, GitRef, UpsertOutcome,
};
use crate::codec::{decode_content, encode_content};
use crate::error::{Result, SyncError};
use crate::retry::{RetryPolicy, with_retry};
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// GitHub client for one repository.
///
/// Every request goes through [`with_retry`] with the client's policy.
#[derive(Debug, Clone)]
pub struct GitHubClient<T> {
    transport: T,
    owner: String,
    repo: String,
    retry: RetryPolicy,
}

impl<T: Transport> GitHubClient<T> {
    /// Creates a client for `owner/repo`.
    ///
    /// # Arguments
    /// * `transport` - Authenticated transport
    /// * `owner` - The repository owner (e.g., "acme")
    /// * `repo` - The repository name (e.g., "design-tokens")
    pub fn new(transport: T, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            transport,
            owner: owner.into(),
            repo: repo.into(),
            retry: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn repo_path(&self, suffix: &str) -> String {
        format!("/repos/{}/{}{}", self.owner, self.repo, suffix)
    }

    fn contents_path(&self, path: &str) -> String {
        self.repo_path(&format!("/contents/{}", encode_path(path)))
    }

    /// Sends a request with retry. A 2xx response, or one whose status is
    /// in `accept`, is returned; any other status becomes
    /// [`SyncError::Status`].
    async fn send(&self, request: HttpRequest, accept: &[u16]) -> Result<HttpResponse> {
        let request = &request;
        let operation = || async move {
            let response = self.transport.send(request).await?;
            if response.is_success() || accept.contains(&response.status) {
                Ok(response)
            } else {
                Err(response.into_error())
            }
        };
        with_retry(
            &self.retry,
            operation,
            |err: &SyncError, _| err.is_retryable(),
            |err, attempt, delay| {
                warn!(
                    method = %request.method,
                    path = %request.path,
                    attempt,
                    ?delay,
                    error = %err,
                    "retrying GitHub request"
                );
            },
        )
        .await
    }

    /// Checks the token and returns the authenticated login.
    pub async fn validate_token(&self) -> Result<String> {
        let response = self.send(HttpRequest::get("/user"), &[]).await?;
        let user: GitHubUser = response.parse()?;
        debug!(login = %user.login, "token validated");
        Ok(user.login)
    }

    /// Fetches repository metadata.
    pub async fn repository(&self) -> Result<GitHubRepository> {
        let response = self.send(HttpRequest::get(self.repo_path("")), &[]).await?;
        response.parse()
    }

    async fn branch_ref(&self, branch: &str) -> Result<Option<GitRef>> {
        let path = self.repo_path(&format!("/git/ref/heads/{}", encode_path(branch)));
        let response = self.send(HttpRequest::get(path), &[404]).await?;
        if response.status == 404 {
            return Ok(None);
        }
        response.parse().map(Some)
    }

    /// Makes sure `branch` exists, creating it from the default branch head.
    ///
    /// Returns `true` when the branch was created.
    pub async fn ensure_branch(&self, branch: &str) -> Result<bool> {
        if self.branch_ref(branch).await?.is_some() {
            return Ok(false);
        }

        let repository = self.repository().await?;
        let base = self
            .branch_ref(&repository.default_branch)
            .await?
            .ok_or_else(|| SyncError::Status {
                status: 404,
                body: format!("default branch '{}' not found", repository.default_branch),
            })?;

        let body = json!({
            "ref": format!("refs/heads/{branch}"),
            "sha": base.object.sha,
        });
        self.send(HttpRequest::post(self.repo_path("/git/refs"), body), &[])
            .await?;

        info!(
            branch,
            from = %repository.default_branch,
            sha = %base.object.sha,
            "created branch"
        );
        Ok(true)
    }

    /// Reads a file from `branch`. Returns `None` when it does not exist.
    pub async fn get_existing_file(&self, path: &str, branch: &str) -> Result<Option<ExistingFile>> {
        let request_path = format!("{}?ref={}", self.contents_path(path), encode_path(branch));
        let response = self.send(HttpRequest::get(request_path), &[404]).await?;
        if response.status == 404 {
            return Ok(None);
        }
        let file: ContentFile = response.parse()?;
        Ok(Some(ExistingFile {
            content: decode_content(&file.content)?,
            sha: file.sha,
            url: file.html_url,
        }))
    }

    /// PUTs `file`. A 409 is handed back to the caller rather than retried.
    async fn put_file(
        &self,
        file: &FileChange,
        branch: &str,
        message: &str,
        sha: Option<&str>,
    ) -> Result<HttpResponse> {
        let mut body = json!({
            "message": message,
            "content": encode_content(&file.content),
            "branch": branch,
        });
        if let Some(sha) = sha {
            body["sha"] = json!(sha);
        }
        self.send(HttpRequest::put(self.contents_path(&file.path), body), &[409])
            .await
    }

    /// Writes one file unless it already carries `file.content_hash`.
    ///
    /// A 409 on the write triggers one refetch: if the file now matches the
    /// write is skipped, otherwise it is retried once with the new SHA. A
    /// second 409 is [`SyncError::Conflict`].
    pub async fn upsert_file(&self, file: &FileChange, branch: &str, message: &str) -> Result<UpsertOutcome> {
        let existing = self.get_existing_file(&file.path, branch).await?;
        if let Some(skip) = matching(existing.as_ref(), &file.content_hash) {
            debug!(path = %file.path, "file unchanged, skipping");
            return Ok(skip);
        }

        let sha = existing.as_ref().map(|found| found.sha.as_str());
        let response = self.put_file(file, branch, message, sha).await?;
        if response.status != 409 {
            return written(&response);
        }

        warn!(path = %file.path, "write conflict, refetching file");
        let refreshed = self.get_existing_file(&file.path, branch).await?;
        if let Some(skip) = matching(refreshed.as_ref(), &file.content_hash) {
            info!(path = %file.path, "conflicting write already carries this content");
            return Ok(skip);
        }

        let sha = refreshed.as_ref().map(|found| found.sha.as_str());
        let response = self.put_file(file, branch, message, sha).await?;
        if response.status == 409 {
            return Err(SyncError::Conflict {
                path: file.path.clone(),
            });
        }
        written(&response)
    }

    /// Commits `files` to `branch`, creating the branch if needed.
    ///
    /// Files are written one at a time, in order. `skipped` is true when
    /// every file already matched.
    pub async fn commit_files(&self, branch: &str, files: &[FileChange], message: &str) -> Result<CommitResult> {
        self.ensure_branch(branch).await?;

        let mut result = CommitResult::default();
        let mut first_skipped_url = None;
        for file in files {
            match self.upsert_file(file, branch, message).await? {
                UpsertOutcome::Written { url } => {
                    result.written.push(file.path.clone());
                    if url.is_some() {
                        result.url = url;
                    }
                }
                UpsertOutcome::Skipped { url } => {
                    result.skipped_files.push(file.path.clone());
                    if first_skipped_url.is_none() {
                        first_skipped_url = url;
                    }
                }
            }
        }

        result.skipped = result.written.is_empty();
        if result.url.is_none() {
            result.url = first_skipped_url;
        }

        info!(
            branch,
            written = result.written.len(),
            skipped = result.skipped_files.len(),
            "commit finished"
        );
        Ok(result)
    }
}

/// `Skipped` when `existing` already embeds `content_hash`.
fn matching(existing: Option<&ExistingFile>, content_hash: &str) -> Option<UpsertOutcome> {
    let existing = existing?;
    let embedded = extract_content_hash(&existing.content)?;
    (embedded == content_hash).then(|| UpsertOutcome::Skipped {
        url: existing.url.clone(),
    })
}

fn written(response: &HttpResponse) -> Result<UpsertOutcome> {
    let update: ContentUpdate = response.parse()?;
    if let Some(content) = &update.content {
        debug!(blob = %content.sha, commit = %update.commit.sha, "file written");
    }
    Ok(UpsertOutcome::Written { url: update.url() })
}

/// Percent-encodes each `/`-separated segment of a repository path.
fn encode_path(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                encoded.push(char::from(byte));
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}
