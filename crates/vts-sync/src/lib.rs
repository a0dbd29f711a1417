//! GitHub sync for exported variable token documents.
//!
//! - [`GitHubClient`]: branch setup and content-hash aware file writes over
//!   a [`Transport`], every request retried with [`with_retry`].
//! - [`SyncCoordinator`]: commits only the documents whose hash differs from
//!   the stored [`SyncState`], then stores the new hashes.
//!
//! # Example
//!
//! ```no_run
//! use vts_sync::{FileStateStore, GitHubClient, ReqwestTransport, SyncCoordinator, SyncOptions};
//!
//! # async fn run(bundle: vts_transform::ExportBundle) -> vts_sync::Result<()> {
//! let transport = ReqwestTransport::new(vts_sync::GITHUB_API_URL, "ghp_...")?;
//! let client = GitHubClient::new(transport, "acme", "design-tokens");
//! let store = FileStateStore::new("sync-state.json");
//! let options = SyncOptions {
//!     branch: "main".to_string(),
//!     base_path: "tokens".to_string(),
//!     message_prefix: None,
//! };
//! let report = SyncCoordinator::new(&client, &store)
//!     .sync_bundle(&bundle, &options, chrono::Utc::now())
//!     .await?;
//! println!("skipped: {}", report.skipped);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod coordinator;
pub mod error;
pub mod github;
pub mod retry;
pub mod state;
pub mod transport;

pub use codec::{decode_content, encode_content};
pub use coordinator::{
    PlannedFile, SyncCoordinator, SyncOptions, SyncPlan, SyncReport, commit_message, plan_sync,
    repo_path,
};
pub use error::{Result, SyncError};
pub use github::{CommitResult, ExistingFile, FileChange, GitHubClient, UpsertOutcome};
pub use retry::{RetryPolicy, with_retry};
pub use state::{FileStateStore, MemoryStateStore, SyncState, SyncStateStore};
pub use transport::{GITHUB_API_URL, HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
