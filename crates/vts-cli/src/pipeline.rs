//! Snapshot loading, export and document writing shared by the commands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};
use vts_model::DocumentSnapshot;
use vts_transform::{ExportBundle, ExportConfig, build_export_bundle};

/// Loads a snapshot and builds its export bundle.
pub async fn export_snapshot(snapshot_path: &Path, config: &ExportConfig) -> Result<ExportBundle> {
    let snapshot = DocumentSnapshot::load(snapshot_path)
        .with_context(|| format!("load snapshot {}", snapshot_path.display()))?;
    build_export_bundle(&snapshot, config)
        .await
        .context("export failed")
}

/// Writes every document of `bundle` under `out_dir`, returning the paths.
pub fn write_bundle(bundle: &ExportBundle, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create output directory {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(bundle.documents.len());
    for document in &bundle.documents {
        let path = out_dir.join(&document.relative_path);
        let text = document.to_text()?;
        fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
        debug!(path = %path.display(), hash = %document.content_hash, "wrote document");
        written.push(path);
    }

    info!(documents = written.len(), out_dir = %out_dir.display(), "export written");
    Ok(written)
}
