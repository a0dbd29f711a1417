//! Interface to the host document model.

use async_trait::async_trait;

use crate::collection::Collection;
use crate::error::Result;
use crate::variable::Variable;

/// The host document model the token pipeline reads from.
///
/// Passed explicitly into every builder so that builders can be exercised
/// against a substitutable fake. All methods are read-only.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Display name of the active document.
    async fn document_name(&self) -> Result<String>;

    /// All local collections, in host enumeration order.
    async fn collections(&self) -> Result<Vec<Collection>>;

    /// All local variables, in host enumeration order.
    async fn variables(&self) -> Result<Vec<Variable>>;

    /// Fetches any variable by id, including library variables that are not
    /// part of the local set. `Ok(None)` when the id is unknown.
    async fn variable_by_id(&self, id: &str) -> Result<Option<Variable>>;
}
