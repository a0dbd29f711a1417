//! Design variable to token transformation.
//!
//! This crate turns the variables of a design document into deterministic,
//! diff-friendly JSON documents in one of two formats:
//!
//! - **DTCG**: the community design token format (`$value`, `$type`,
//!   `$extensions`), always a single file
//! - **Figma native**: the host's own collection/group/variable hierarchy,
//!   either as one file or one file per collection
//!
//! Every document carries a SHA-256 content hash computed over its payload
//! only, so re-exporting unchanged variables at a later time produces the
//! same hash.
//!
//! # Pipeline
//!
//! 1. [`normalize`] raw host values into [`NormalizedValue`]
//! 2. [`path`] builds the token path of every variable
//! 3. [`resolve`] builds the variable id -> path map, fetching library
//!    variables referenced by aliases
//! 4. [`convert`] maps values to format-specific output values
//! 5. [`dtcg`] / [`native`] assemble complete documents
//! 6. [`export`] wraps the documents into an [`ExportBundle`]
//!
//! # Example
//!
//! ```no_run
//! use vts_model::DocumentSnapshot;
//! use vts_transform::{ExportConfig, build_export_bundle};
//!
//! async fn export() -> vts_transform::Result<()> {
//!     let snapshot = DocumentSnapshot::load(std::path::Path::new("document.json"))
//!         .map_err(vts_transform::TransformError::from)?;
//!     let bundle = build_export_bundle(&snapshot, &ExportConfig::default()).await?;
//!     for document in &bundle.documents {
//!         println!("{} {}", document.relative_path, document.content_hash);
//!     }
//!     Ok(())
//! }
//! ```

pub mod canonical;
pub mod color;
pub mod convert;
pub mod document;
pub mod dtcg;
pub mod error;
pub mod export;
pub mod hash;
pub mod native;
pub mod normalize;
pub mod path;
pub mod resolve;

pub use canonical::{canonicalize, json_number, to_canonical_string};
pub use color::{Rgba, hex_to_rgb, rgb_to_hex};
pub use convert::{DtcgType, NativeModeValue, convert_value, map_dtcg_type, should_be_dimension};
pub use document::{
    DocumentMeta, ExportDocument, ExportFormat, ExportType, FIGMA_EXTENSION, TOOL_VERSION,
    extract_content_hash,
};
pub use error::{Result, TransformError};
pub use export::{
    ExportBundle, ExportConfig, ExportSummary, build_export_bundle, build_export_bundle_at,
};
pub use hash::{hash_value, sha256_hex};
pub use normalize::{NormalizedValue, normalize};
pub use path::{NativePath, build_token_path, slugify};
pub use resolve::{PathMap, PathStyle, build_path_map};
