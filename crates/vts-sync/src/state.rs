//! Persisted sync state: the content hash last committed for each path.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// Hashes of the documents as last committed, keyed by repository path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    /// Repository path to content hash.
    #[serde(default)]
    pub hashes: BTreeMap<String, String>,
    /// When the state was last written.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SyncState {
    /// State recording `hashes` at `updated_at`.
    #[must_use]
    pub fn new(hashes: BTreeMap<String, String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            hashes,
            updated_at: Some(updated_at),
        }
    }

    /// Stored hash for a path.
    #[must_use]
    pub fn hash(&self, path: &str) -> Option<&str> {
        self.hashes.get(path).map(String::as_str)
    }

    /// Whether nothing has been committed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

/// Loads and saves [`SyncState`]. Saves replace the whole state.
pub trait SyncStateStore: Send + Sync {
    /// Loads the state. A store with nothing saved yields the empty state.
    fn load(&self) -> Result<SyncState>;

    /// Replaces the stored state.
    fn save(&self, state: &SyncState) -> Result<()>;
}

/// JSON file store with atomic writes.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default state file for a branch: `<data_dir>/sync-state/<owner>/<repo>/<branch>.json`.
    ///
    /// Slashes in branch names are kept as nested folders.
    pub fn for_branch(data_dir: &Path, owner: &str, repo: &str, branch: &str) -> Self {
        let path = data_dir
            .join("sync-state")
            .join(owner)
            .join(repo)
            .join(format!("{branch}.json"));
        Self::new(path)
    }

    /// Path of the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SyncStateStore for FileStateStore {
    fn load(&self) -> Result<SyncState> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no sync state yet");
            return Ok(SyncState::default());
        }
        let content = fs::read_to_string(&self.path).map_err(|source| SyncError::Io {
            operation: "read",
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| {
            SyncError::State(format!("invalid sync state in {}: {e}", self.path.display()))
        })
    }

    fn save(&self, state: &SyncState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        let temp_path = self.path.with_extension("json.tmp");

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SyncError::Io {
                operation: "create directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = File::create(&temp_path).map_err(|source| SyncError::Io {
            operation: "create",
            path: temp_path.clone(),
            source,
        })?;
        file.write_all(json.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|source| SyncError::Io {
                operation: "write",
                path: temp_path.clone(),
                source,
            })?;

        fs::rename(&temp_path, &self.path).map_err(|source| SyncError::Io {
            operation: "replace",
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(path = %self.path.display(), documents = state.hashes.len(), "saved sync state");
        Ok(())
    }
}

/// In-memory store, for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Mutex<SyncState>,
}

impl MemoryStateStore {
    pub fn new(state: SyncState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Result<SyncState> {
        self.load()
    }
}

impl SyncStateStore for MemoryStateStore {
    fn load(&self) -> Result<SyncState> {
        self.state
            .lock()
            .map(|state| state.clone())
            .map_err(|_| SyncError::State("state lock poisoned".to_string()))
    }

    fn save(&self, state: &SyncState) -> Result<()> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| SyncError::State("state lock poisoned".to_string()))?;
        *guard = state.clone();
        Ok(())
    }
}
