//! Admin credential type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed id of the single credential record.
pub const CREDENTIAL_ID: &str = "admin";

/// The admin login credential. Exactly one exists system-wide.
///
/// Serialized with snake_case keys to match `auth-credentials.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    #[serde(default = "default_credential_id")]
    pub id: String,
    /// Encoded password hash (see `crypto::PasswordHasher`). Older data
    /// directories stored the plain password under `password`.
    #[serde(alias = "password")]
    pub password_hash: String,
    #[serde(with = "crate::utils::datetime")]
    pub last_updated: DateTime<Utc>,
    /// Free-text version tag
    #[serde(default)]
    pub version: String,
}

fn default_credential_id() -> String {
    CREDENTIAL_ID.to_string()
}

impl Credential {
    /// Build a credential record from an already-encoded hash.
    #[must_use]
    pub fn new(password_hash: String, version: impl Into<String>) -> Self {
        Self {
            id: CREDENTIAL_ID.to_string(),
            password_hash,
            last_updated: Utc::now(),
            version: version.into(),
        }
    }
}

/// Outcome of a password update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordUpdate {
    /// Written to the authoritative store
    Persisted,
    /// Every write attempt failed; only the in-process cache holds the new password
    CachedOnly,
}
