//! Credential persistence abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::Credential;

/// Credential repository Trait
///
/// Holds the single admin credential record.
///
/// Platform implementation:
/// - JSON files: `JsonFileStore` (`auth-credentials.json`)
/// - SQLite: `SqliteStore` (`credential` table)
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Load the credential
    ///
    /// # Returns
    /// * `Ok(Some(credential))` - credential exists
    /// * `Ok(None)` - nothing stored yet (before bootstrap)
    async fn get_credential(&self) -> CoreResult<Option<Credential>>;

    /// Upsert the credential by its fixed id
    async fn save_credential(&self, credential: &Credential) -> CoreResult<()>;
}
