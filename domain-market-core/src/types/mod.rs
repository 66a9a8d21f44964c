//! 类型定义模块

mod backup;
mod credential;
mod domain;
mod link;
mod record;
mod registrar;
pub mod settings;

pub use backup::{
    AuthSnapshot, BackupDownload, BackupEnvelope, DatabaseBackupInfo, RestoreReport,
    RestoredSection, SnapshotInfo, SnapshotOptions, ENVELOPE_VERSION,
};
pub use credential::{Credential, PasswordUpdate, CREDENTIAL_ID};
pub use domain::{Domain, DomainStatus, SoldDomain};
pub use link::FriendlyLink;
pub use record::{ensure_unique_keys, stamp_records, Record};
pub use registrar::Registrar;
pub use settings::{default_site_settings, SiteSettings};

use serde::{Deserialize, Serialize};

/// Collections that support single-record deletion by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordKind {
    Domains,
    SoldDomains,
    FriendlyLinks,
}

impl RecordKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Domains => "domains",
            Self::SoldDomains => "sold-domains",
            Self::FriendlyLinks => "friendly-links",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "domains" => Ok(Self::Domains),
            "sold-domains" | "soldDomains" => Ok(Self::SoldDomains),
            "friendly-links" | "friendlyLinks" => Ok(Self::FriendlyLinks),
            other => Err(format!("unknown record kind: {other}")),
        }
    }
}
