//! Named JSON document store abstract Trait

use async_trait::async_trait;
use serde_json::Value;

/// Extension every document name carries.
pub const DOCUMENT_EXTENSION: &str = ".json";

/// Whether `name` is a plain `*.json` file name (no directories, no `..`).
#[must_use]
pub fn is_valid_document_name(name: &str) -> bool {
    name.len() > DOCUMENT_EXTENSION.len()
        && name.ends_with(DOCUMENT_EXTENSION)
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
        && !name.contains("..")
}

/// Whole-document JSON store keyed by file name.
///
/// All operations are best-effort: failures are logged and degrade to the
/// default value / `false` instead of raising.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Parsed content of `name`, or `default` if absent or unreadable.
    async fn read(&self, name: &str, default: Value) -> Value;

    /// Overwrite `name` with pretty-printed JSON. `false` on any I/O error.
    async fn write(&self, name: &str, document: &Value) -> bool;

    /// Every `*.json` document name, sorted.
    async fn list(&self) -> Vec<String>;

    /// Remove `name`. An already-absent document counts as success.
    async fn delete(&self, name: &str) -> bool;
}
