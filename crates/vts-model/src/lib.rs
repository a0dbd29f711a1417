//! Design variable data model for Variable Token Sync.
//!
//! This crate provides the read-only snapshot types that the token pipeline
//! consumes, and the interface to the host document model that produces them:
//!
//! - [`Collection`] and [`Mode`]: named groupings of variables sharing an
//!   ordered set of modes (e.g. Light/Dark)
//! - [`Variable`]: one design variable with a raw value per mode
//! - [`DocumentSource`]: the host collaborator (enumerate collections and
//!   variables, fetch a variable by id, read the document name)
//! - [`DocumentSnapshot`]: a JSON snapshot of a document that implements
//!   [`DocumentSource`], used by the CLI and in tests
//!
//! # Module Organization
//!
//! - [`collection`]: Collections and modes
//! - [`variable`]: Variables and resolved types
//! - [`source`]: The async document source trait
//! - [`snapshot`]: File-backed document snapshot

pub mod collection;
pub mod error;
pub mod snapshot;
pub mod source;
pub mod variable;

pub use collection::{Collection, Mode};
pub use error::{ModelError, Result};
pub use snapshot::DocumentSnapshot;
pub use source::DocumentSource;
pub use variable::{RawValue, ResolvedType, Variable};
