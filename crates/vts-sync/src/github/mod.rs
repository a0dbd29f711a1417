//! GitHub API client and types.
//!
//! This module provides a client for the contents, refs, repository and
//! user endpoints used to commit documents.

pub mod client;
pub mod types;

pub use client::GitHubClient;
pub use types::{CommitResult, ExistingFile, FileChange, UpsertOutcome};
