//! Sync coordinator: commits the documents of an export bundle whose hash
//! changed since the last successful sync.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{Instrument, info, info_span};
use vts_transform::{ExportBundle, ExportSummary};

use crate::error::Result;
use crate::github::{FileChange, GitHubClient};
use crate::state::{SyncState, SyncStateStore};
use crate::transport::Transport;

/// One document scheduled for commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    /// Path inside the repository.
    pub repo_path: String,
    /// Path inside the bundle.
    pub relative_path: String,
    /// Current content hash.
    pub content_hash: String,
    /// Hash recorded by the last sync, if any.
    pub previous_hash: Option<String>,
}

/// Which documents differ from the stored state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// Documents to commit, in bundle order.
    pub changed: Vec<PlannedFile>,
    /// Repository paths whose hash matches the state.
    pub unchanged: Vec<String>,
    /// Full hash map of the bundle, stored after a successful commit.
    pub hashes: BTreeMap<String, String>,
}

impl SyncPlan {
    /// Whether there is nothing to commit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}

/// Where and how to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Target branch.
    pub branch: String,
    /// Repository folder the documents go under.
    pub base_path: String,
    /// Text put in front of the generated commit message.
    pub message_prefix: Option<String>,
}

/// Outcome of [`SyncCoordinator::sync_bundle`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// True when nothing was written.
    pub skipped: bool,
    /// URL of the written (or matching) file.
    pub url: Option<String>,
    /// Commit message used, when a commit was attempted.
    pub message: Option<String>,
    /// Repository paths written.
    pub written: Vec<String>,
    /// Repository paths that needed no write.
    pub unchanged: Vec<String>,
}

/// Joins `base_path` and a bundle-relative path.
#[must_use]
pub fn repo_path(base_path: &str, relative_path: &str) -> String {
    let base = base_path.trim_matches('/');
    let relative = relative_path.trim_start_matches('/');
    if base.is_empty() {
        relative.to_string()
    } else {
        format!("{base}/{relative}")
    }
}

/// Compares the bundle against the stored hashes. No network activity.
#[must_use]
pub fn plan_sync(bundle: &ExportBundle, state: &SyncState, base_path: &str) -> SyncPlan {
    let mut plan = SyncPlan::default();
    for document in &bundle.documents {
        let path = repo_path(base_path, &document.relative_path);
        let previous = state.hash(&path);
        if previous == Some(document.content_hash.as_str()) {
            plan.unchanged.push(path.clone());
        } else {
            plan.changed.push(PlannedFile {
                repo_path: path.clone(),
                relative_path: document.relative_path.clone(),
                content_hash: document.content_hash.clone(),
                previous_hash: previous.map(str::to_string),
            });
        }
        plan.hashes.insert(path, document.content_hash.clone());
    }
    plan
}

/// Builds the commit message for an export.
///
/// `Update design tokens: 12 variables in 2 collections (2026-05-04T09:00:00.000Z)`,
/// with `prefix` and a space in front when given.
#[must_use]
pub fn commit_message(prefix: Option<&str>, summary: &ExportSummary, at: DateTime<Utc>) -> String {
    let body = format!(
        "Update design tokens: {} variables in {} collections ({})",
        summary.variables_count,
        summary.collections_count,
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    );
    match prefix.map(str::trim).filter(|prefix| !prefix.is_empty()) {
        Some(prefix) => format!("{prefix} {body}"),
        None => body,
    }
}

/// Commits changed documents and records the new hashes.
pub struct SyncCoordinator<'a, T, S> {
    client: &'a GitHubClient<T>,
    store: &'a S,
}

impl<'a, T: Transport, S: SyncStateStore> SyncCoordinator<'a, T, S> {
    pub fn new(client: &'a GitHubClient<T>, store: &'a S) -> Self {
        Self { client, store }
    }

    /// Current plan for `bundle`.
    pub fn plan(&self, bundle: &ExportBundle, base_path: &str) -> Result<SyncPlan> {
        let state = self.store.load()?;
        Ok(plan_sync(bundle, &state, base_path))
    }

    /// Commits the changed documents of `bundle`.
    ///
    /// With nothing changed this returns a skipped report without touching
    /// the network. After a successful commit the hashes of every document
    /// in the bundle are stored, not only the changed ones.
    pub async fn sync_bundle(
        &self,
        bundle: &ExportBundle,
        options: &SyncOptions,
        now: DateTime<Utc>,
    ) -> Result<SyncReport> {
        let span = info_span!("sync", branch = %options.branch);
        self.run(bundle, options, now).instrument(span).await
    }

    async fn run(&self, bundle: &ExportBundle, options: &SyncOptions, now: DateTime<Utc>) -> Result<SyncReport> {
        let plan = self.plan(bundle, &options.base_path)?;
        if plan.is_empty() {
            info!(documents = plan.unchanged.len(), "no changes to sync");
            return Ok(SyncReport {
                skipped: true,
                unchanged: plan.unchanged,
                ..SyncReport::default()
            });
        }

        let mut files = Vec::with_capacity(plan.changed.len());
        for planned in &plan.changed {
            let Some(document) = bundle.document(&planned.relative_path) else {
                continue;
            };
            files.push(FileChange {
                path: planned.repo_path.clone(),
                content: document.to_text()?,
                content_hash: planned.content_hash.clone(),
            });
        }

        let message = commit_message(options.message_prefix.as_deref(), &bundle.summary, now);
        let result = self
            .client
            .commit_files(&options.branch, &files, &message)
            .await?;

        self.store.save(&SyncState::new(plan.hashes, now))?;

        let mut unchanged = plan.unchanged;
        unchanged.extend(result.skipped_files);
        info!(
            written = result.written.len(),
            unchanged = unchanged.len(),
            "sync complete"
        );

        Ok(SyncReport {
            skipped: result.skipped,
            url: result.url,
            message: Some(message),
            written: result.written,
            unchanged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;
    use vts_transform::{ExportDocument, ExportFormat, ExportType};

    fn bundle(docs: &[(&str, &str)]) -> ExportBundle {
        let documents = docs
            .iter()
            .map(|(path, hash)| ExportDocument {
                relative_path: (*path).to_string(),
                format: ExportFormat::FigmaNative,
                export_type: ExportType::PerCollection,
                collection_id: None,
                collection_name: None,
                variables_count: 3,
                collections_count: 1,
                content_hash: (*hash).to_string(),
                content: Value::Null,
            })
            .collect::<Vec<_>>();
        ExportBundle {
            summary: ExportSummary {
                format: ExportFormat::FigmaNative,
                export_type: ExportType::PerCollection,
                exported_at: "2026-05-04T09:00:00.000Z".to_string(),
                file_name: "Design System".to_string(),
                documents_count: documents.len(),
                variables_count: 3 * documents.len(),
                collections_count: documents.len(),
                bundle_hash: String::new(),
            },
            documents,
        }
    }

    #[test]
    fn test_repo_path() {
        assert_eq!(repo_path("tokens", "a.json"), "tokens/a.json");
        assert_eq!(repo_path("/tokens/", "/a.json"), "tokens/a.json");
        assert_eq!(repo_path("", "a.json"), "a.json");
    }

    #[test]
    fn test_plan_detects_changes() {
        let bundle = bundle(&[("colors.json", "c2"), ("spacing.json", "s1"), ("new.json", "n1")]);
        let mut state = SyncState::default();
        state.hashes.insert("tokens/colors.json".to_string(), "c1".to_string());
        state.hashes.insert("tokens/spacing.json".to_string(), "s1".to_string());

        let plan = plan_sync(&bundle, &state, "tokens");
        let changed: Vec<&str> = plan.changed.iter().map(|f| f.repo_path.as_str()).collect();
        assert_eq!(changed, vec!["tokens/colors.json", "tokens/new.json"]);
        assert_eq!(plan.changed[0].previous_hash.as_deref(), Some("c1"));
        assert_eq!(plan.changed[1].previous_hash, None);
        assert_eq!(plan.unchanged, vec!["tokens/spacing.json"]);
        assert_eq!(plan.hashes.len(), 3);
    }

    #[test]
    fn test_plan_empty_when_state_matches() {
        let bundle = bundle(&[("tokens.json", "h")]);
        let mut state = SyncState::default();
        state.hashes.insert("tokens/tokens.json".to_string(), "h".to_string());
        assert!(plan_sync(&bundle, &state, "tokens").is_empty());
    }

    #[test]
    fn test_commit_message() {
        let bundle = bundle(&[("a.json", "1"), ("b.json", "2")]);
        let at = Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap();
        assert_eq!(
            commit_message(None, &bundle.summary, at),
            "Update design tokens: 6 variables in 2 collections (2026-05-04T09:00:00.000Z)"
        );
        assert_eq!(
            commit_message(Some("chore(tokens):"), &bundle.summary, at),
            "chore(tokens): Update design tokens: 6 variables in 2 collections (2026-05-04T09:00:00.000Z)"
        );
        assert_eq!(
            commit_message(Some("  "), &bundle.summary, at),
            commit_message(None, &bundle.summary, at)
        );
    }
}
