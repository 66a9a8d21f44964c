//! Backup / restore related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Domain, FriendlyLink, Registrar, SiteSettings, SoldDomain};

/// Current envelope format version.
pub const ENVELOPE_VERSION: &str = "2.0";

/// Credential section of a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthSnapshot {
    /// Encoded hash; envelopes written by older versions carry the plain password.
    #[serde(alias = "password")]
    pub password_hash: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::datetime::option"
    )]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Versioned, timestamped bundle of collections. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupEnvelope {
    pub version: String,
    #[serde(with = "crate::utils::datetime")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<Domain>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_domains: Option<Vec<SoldDomain>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_links: Option<Vec<FriendlyLink>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrars: Option<Vec<Registrar>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_settings: Option<SiteSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthSnapshot>,
}

/// Which optional sections a snapshot includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotOptions {
    pub include_settings: bool,
    pub include_auth: bool,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            include_settings: true,
            include_auth: true,
        }
    }
}

/// Snapshot serialized for client download.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDownload {
    /// Pretty-printed JSON
    pub content: String,
    pub suggested_filename: String,
}

/// A snapshot persisted under the data directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotInfo {
    pub name: String,
}

/// Sections applied by a restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RestoredSection {
    Domains,
    SoldDomains,
    FriendlyLinks,
    Registrars,
    SiteSettings,
    Auth,
}

/// Result of applying an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    pub sections: Vec<RestoredSection>,
    /// Consumers must drop every in-memory copy of market data.
    pub reload_required: bool,
}

/// Raw database backup file listed in the data directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseBackupInfo {
    pub name: String,
    pub size: u64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::datetime::option"
    )]
    pub modified_at: Option<DateTime<Utc>>,
}
