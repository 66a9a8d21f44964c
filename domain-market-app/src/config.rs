//! Environment-driven storage configuration.
//!
//! The backend is chosen once per process. An explicit `DOMAIN_MARKET_STORAGE`
//! wins; otherwise serverless/static deployments get the JSON backend and
//! everything else gets SQLite.

use std::path::PathBuf;

use domain_market_core::crypto::{PasswordHasher, DEFAULT_ITERATIONS};
use domain_market_core::error::{CoreError, CoreResult};
use domain_market_core::services::{AutoBackupPolicy, CredentialPolicy};
use domain_market_core::traits::StorageKind;

pub const ENV_DATA_DIR: &str = "DOMAIN_MARKET_DATA_DIR";
pub const ENV_DEPLOYMENT: &str = "DOMAIN_MARKET_DEPLOYMENT";
pub const ENV_STORAGE: &str = "DOMAIN_MARKET_STORAGE";
pub const ENV_DEFAULT_PASSWORD: &str = "DOMAIN_MARKET_DEFAULT_PASSWORD";
pub const ENV_HASH_ITERATIONS: &str = "DOMAIN_MARKET_HASH_ITERATIONS";
pub const ENV_AUTO_BACKUP_HOURS: &str = "DOMAIN_MARKET_AUTO_BACKUP_HOURS";

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_AUTO_BACKUP_HOURS: u64 = 12;

/// Deployment names that have no writable local database
const FILE_ONLY_DEPLOYMENTS: &[&str] = &["serverless", "static", "vercel", "netlify"];

/// Variables set by hosting platforms themselves
const PLATFORM_MARKERS: &[&str] = &["VERCEL", "NETLIFY"];

/// Resolved storage settings for one process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub storage: StorageKind,
    /// Deployment indicator the backend choice was derived from
    pub deployment: Option<String>,
    pub default_password: String,
    pub hash_iterations: u32,
    pub auto_backup_hours: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage: default_storage(),
            deployment: None,
            default_password: CredentialPolicy::default().default_password,
            hash_iterations: DEFAULT_ITERATIONS,
            auto_backup_hours: DEFAULT_AUTO_BACKUP_HOURS,
        }
    }
}

impl StorageConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let deployment = get(ENV_DEPLOYMENT).or_else(|| {
            PLATFORM_MARKERS
                .iter()
                .find(|marker| get(marker).is_some())
                .map(|marker| marker.to_ascii_lowercase())
        });

        let storage = match get(ENV_STORAGE) {
            Some(value) => value
                .parse::<StorageKind>()
                .map_err(|e| CoreError::ValidationError(format!("{ENV_STORAGE}: {e}")))?,
            None if deployment.as_deref().is_some_and(is_file_only_deployment) => {
                StorageKind::Json
            }
            None => defaults.storage,
        };

        let hash_iterations = match get(ENV_HASH_ITERATIONS) {
            Some(value) => parse_number::<u32>(ENV_HASH_ITERATIONS, &value)?,
            None => defaults.hash_iterations,
        };
        if hash_iterations == 0 {
            return Err(CoreError::ValidationError(format!(
                "{ENV_HASH_ITERATIONS} must be positive"
            )));
        }

        let auto_backup_hours = match get(ENV_AUTO_BACKUP_HOURS) {
            Some(value) => parse_number::<u64>(ENV_AUTO_BACKUP_HOURS, &value)?,
            None => defaults.auto_backup_hours,
        };

        Ok(Self {
            data_dir: get(ENV_DATA_DIR).map_or(defaults.data_dir, PathBuf::from),
            storage,
            deployment,
            default_password: get(ENV_DEFAULT_PASSWORD).unwrap_or(defaults.default_password),
            hash_iterations,
            auto_backup_hours,
        })
    }

    #[must_use]
    pub fn credential_policy(&self) -> CredentialPolicy {
        CredentialPolicy {
            default_password: self.default_password.clone(),
            hasher: PasswordHasher::new(self.hash_iterations),
            ..CredentialPolicy::default()
        }
    }

    #[must_use]
    pub fn auto_backup_policy(&self) -> AutoBackupPolicy {
        AutoBackupPolicy::with_threshold_hours(self.auto_backup_hours)
    }
}

fn is_file_only_deployment(name: &str) -> bool {
    FILE_ONLY_DEPLOYMENTS
        .iter()
        .any(|d| d.eq_ignore_ascii_case(name))
}

/// SQLite when it is compiled in, JSON otherwise.
const fn default_storage() -> StorageKind {
    if cfg!(feature = "sqlite-store") {
        StorageKind::Sqlite
    } else {
        StorageKind::Json
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> CoreResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| CoreError::ValidationError(format!("{key}={value}: {e}")))
}
