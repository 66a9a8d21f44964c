//! Storage event hooks.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// What happened when a corrupt database file was replaced.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SelfHealReport {
    /// Live database path that was recreated
    pub database: PathBuf,
    /// Copy of the unreadable file
    pub corrupt_copy: PathBuf,
    /// Why the file was considered unreadable
    pub reason: String,
    pub recovered_at: DateTime<Utc>,
}

/// Platform callbacks for storage events.
///
/// Frontends implement this to surface self-heal events to operators.
/// Use `NoopStorageHooks` when the log line is enough.
#[async_trait::async_trait]
pub trait StorageHooks: Send + Sync {
    /// Called after an unreadable database was backed up and recreated empty.
    async fn database_recovered(&self, _report: &SelfHealReport) {}
}

/// Hooks that do nothing.
pub struct NoopStorageHooks;

#[async_trait::async_trait]
impl StorageHooks for NoopStorageHooks {}
