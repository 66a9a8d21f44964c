//! Storage backend abstract Trait

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CredentialRepository, MarketRepository, SettingsRepository};
use crate::error::CoreResult;

/// Which backend a process is running on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Flat JSON documents in the data directory
    Json,
    /// Embedded SQLite database file
    Sqlite,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Sqlite => f.write_str("sqlite"),
        }
    }
}

impl std::str::FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "file" | "files" => Ok(Self::Json),
            "sqlite" | "sql" | "db" | "database" => Ok(Self::Sqlite),
            other => Err(format!("unknown storage kind: {other}")),
        }
    }
}

/// A complete storage backend: every repository plus structure creation.
#[async_trait]
pub trait StorageBackend: CredentialRepository + MarketRepository + SettingsRepository {
    fn kind(&self) -> StorageKind;

    /// Create the storage structures if absent (directory, empty collection
    /// documents, SQL tables). Must be idempotent.
    async fn initialize(&self) -> CoreResult<()>;
}
