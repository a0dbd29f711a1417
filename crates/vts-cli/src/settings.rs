//! User settings, persisted as TOML in the platform config directory.
//!
//! The access token is never stored here.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use vts_sync::{GITHUB_API_URL, RetryPolicy};
use vts_transform::{ExportConfig, ExportFormat, ExportType};

/// Environment variables checked for the access token, in order.
pub const TOKEN_ENV_VARS: [&str; 2] = ["VTS_GITHUB_TOKEN", "GITHUB_TOKEN"];

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Export settings.
    pub export: ExportSettings,

    /// Target repository.
    pub github: GitHubSettings,

    /// Backoff for GitHub requests.
    pub retry: RetryPolicy,
}

/// Export defaults, overridable per command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// `dtcg` or `figma-native`.
    pub format: ExportFormat,
    /// `singleFile` or `perCollection`.
    pub export_type: ExportType,
}

impl ExportSettings {
    #[must_use]
    pub fn config(&self) -> ExportConfig {
        ExportConfig::new(self.format, self.export_type)
    }
}

/// Repository the documents are committed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Folder inside the repository the documents go under.
    pub base_path: String,
    /// Text put in front of generated commit messages.
    pub commit_prefix: Option<String>,
    pub api_base: String,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            branch: "main".to_string(),
            base_path: "tokens".to_string(),
            commit_prefix: None,
            api_base: GITHUB_API_URL.to_string(),
        }
    }
}

impl GitHubSettings {
    /// Fails unless owner and repo are set.
    pub fn require_repository(&self) -> Result<()> {
        if self.owner.trim().is_empty() || self.repo.trim().is_empty() {
            bail!("no repository configured: set owner and repo in the [github] settings");
        }
        Ok(())
    }
}

impl Settings {
    /// Load settings from the default path.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from a specific path. Missing or invalid files yield
    /// the defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|error| {
                tracing::warn!(path = %path.display(), %error, "ignoring invalid settings file");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create config directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("serialize settings")?;
        std::fs::write(path, content).with_context(|| format!("write {}", path.display()))
    }

    /// Get the default config file path.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "VariableTokenSync", "vts")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
            .unwrap_or_else(|| PathBuf::from("settings.toml"))
    }

    /// Directory for sync state files.
    pub fn data_dir() -> PathBuf {
        directories::ProjectDirs::from("com", "VariableTokenSync", "vts")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".vts"))
    }
}

/// Picks the access token: the explicit value first, then the environment.
pub fn resolve_token(explicit: Option<&str>) -> Result<String> {
    let from_env = || {
        TOKEN_ENV_VARS
            .iter()
            .find_map(|name| std::env::var(name).ok())
    };
    explicit
        .map(str::to_string)
        .or_else(from_env)
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .with_context(|| {
            format!(
                "no GitHub token: pass --token or set {}",
                TOKEN_ENV_VARS.join(" or ")
            )
        })
}
