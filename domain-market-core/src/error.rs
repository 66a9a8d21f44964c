//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Requested record, document or backup does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error (record shape, password policy, ...)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Backup envelope rejected on restore
    #[error("Restore error: {0}")]
    Restore(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Bootstrap has not completed (or failed)
    #[error("Storage not ready: {0}")]
    StorageUnready(String),

    /// serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Credential hashing / lookup error
    #[error("Credential error: {0}")]
    CredentialError(String),

    /// File name does not follow the database backup naming convention
    #[error("Invalid backup name: {0}")]
    InvalidBackupName(String),

    /// Uploaded file rejected
    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.) is used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added. **
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::NotFound(_)
            | Self::ValidationError(_)
            | Self::Restore(_)
            | Self::InvalidBackupName(_)
            | Self::UnsupportedFile(_) => true,
            Self::StorageError(_)
            | Self::StorageUnready(_)
            | Self::SerializationError(_)
            | Self::CredentialError(_) => false,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
