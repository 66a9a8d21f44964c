//! JSON file backend.
//!
//! Every collection is one whole JSON document in the data directory. The
//! same store also serves named documents (snapshots, scheduler state).
//! Writes overwrite the file in place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use domain_market_core::error::{CoreError, CoreResult};
use domain_market_core::traits::{
    is_valid_document_name, CredentialRepository, DocumentStore, MarketRepository,
    SettingsRepository, StorageBackend, StorageKind,
};
use domain_market_core::types::{
    Credential, Domain, FriendlyLink, RecordKind, Registrar, SiteSettings, SoldDomain,
};

pub const CREDENTIALS_FILE: &str = "auth-credentials.json";
pub const DOMAINS_FILE: &str = "domains.json";
pub const SOLD_DOMAINS_FILE: &str = "sold-domains.json";
pub const FRIENDLY_LINKS_FILE: &str = "friendly-links.json";
pub const REGISTRARS_FILE: &str = "registrars.json";
pub const SITE_SETTINGS_FILE: &str = "site-settings.json";

const COLLECTION_FILES: [&str; 4] = [
    DOMAINS_FILE,
    SOLD_DOMAINS_FILE,
    FRIENDLY_LINKS_FILE,
    REGISTRARS_FILE,
];

/// Row layout of `site-settings.json` written by older releases
#[derive(Deserialize)]
struct LegacySettingRow {
    key: String,
    #[serde(default)]
    value: Option<String>,
}

/// Whole-file JSON store rooted at a data directory.
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn document_path(&self, name: &str) -> Option<PathBuf> {
        is_valid_document_name(name).then(|| self.data_dir.join(name))
    }

    /// Typed read; missing or unreadable documents yield `T::default()`.
    async fn read_typed<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        match self.read(name, Value::Null).await {
            Value::Null => T::default(),
            value => serde_json::from_value(value).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed {name}: {e}");
                T::default()
            }),
        }
    }

    async fn write_typed<T: Serialize + ?Sized>(&self, name: &str, data: &T) -> CoreResult<()> {
        let value = serde_json::to_value(data)?;
        if self.write(name, &value).await {
            Ok(())
        } else {
            Err(CoreError::StorageError(format!("failed to write {name}")))
        }
    }

    /// Remove the record with `id` from a collection document.
    async fn remove_by_id<T>(&self, name: &str, id: &str, key: fn(&T) -> &str) -> CoreResult<bool>
    where
        T: DeserializeOwned + Serialize,
    {
        let mut records: Vec<T> = self.read_typed(name).await;
        let before = records.len();
        records.retain(|r| key(r) != id);
        if records.len() == before {
            return Ok(false);
        }
        self.write_typed(name, &records).await?;
        Ok(true)
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn read(&self, name: &str, default: Value) -> Value {
        let Some(path) = self.document_path(name) else {
            log::warn!("Refusing to read invalid document name: {name}");
            return default;
        };
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return default,
            Err(e) => {
                log::warn!("Failed to read {}: {e}", path.display());
                return default;
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Invalid JSON in {}: {e}", path.display());
            default
        })
    }

    async fn write(&self, name: &str, document: &Value) -> bool {
        let Some(path) = self.document_path(name) else {
            log::warn!("Refusing to write invalid document name: {name}");
            return false;
        };
        let content = match serde_json::to_string_pretty(document) {
            Ok(content) => content,
            Err(e) => {
                log::error!("Failed to serialize {name}: {e}");
                return false;
            }
        };
        if let Err(e) = tokio::fs::create_dir_all(&self.data_dir).await {
            log::error!("Failed to create {}: {e}", self.data_dir.display());
            return false;
        }
        match tokio::fs::write(&path, content).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to write {}: {e}", path.display());
                false
            }
        }
    }

    async fn list(&self) -> Vec<String> {
        let mut entries = match tokio::fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to list {}: {e}", self.data_dir.display());
                }
                return Vec::new();
            }
        };

        let mut names = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
                    if let Some(name) = entry.file_name().to_str() {
                        if is_file && is_valid_document_name(name) {
                            names.push(name.to_string());
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    log::warn!("Failed to list {}: {e}", self.data_dir.display());
                    break;
                }
            }
        }
        names.sort();
        names
    }

    async fn delete(&self, name: &str) -> bool {
        let Some(path) = self.document_path(name) else {
            log::warn!("Refusing to delete invalid document name: {name}");
            return false;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                log::error!("Failed to delete {}: {e}", path.display());
                false
            }
        }
    }
}

#[async_trait]
impl CredentialRepository for JsonFileStore {
    async fn get_credential(&self) -> CoreResult<Option<Credential>> {
        let credentials: Vec<Credential> = self.read_typed(CREDENTIALS_FILE).await;
        Ok(credentials.into_iter().next())
    }

    async fn save_credential(&self, credential: &Credential) -> CoreResult<()> {
        self.write_typed(CREDENTIALS_FILE, std::slice::from_ref(credential))
            .await
    }
}

#[async_trait]
impl MarketRepository for JsonFileStore {
    async fn find_domains(&self) -> CoreResult<Vec<Domain>> {
        Ok(self.read_typed(DOMAINS_FILE).await)
    }

    async fn replace_domains(&self, domains: &[Domain]) -> CoreResult<()> {
        self.write_typed(DOMAINS_FILE, domains).await
    }

    async fn find_sold_domains(&self) -> CoreResult<Vec<SoldDomain>> {
        Ok(self.read_typed(SOLD_DOMAINS_FILE).await)
    }

    async fn replace_sold_domains(&self, sold: &[SoldDomain]) -> CoreResult<()> {
        self.write_typed(SOLD_DOMAINS_FILE, sold).await
    }

    async fn find_friendly_links(&self) -> CoreResult<Vec<FriendlyLink>> {
        Ok(self.read_typed(FRIENDLY_LINKS_FILE).await)
    }

    async fn replace_friendly_links(&self, links: &[FriendlyLink]) -> CoreResult<()> {
        self.write_typed(FRIENDLY_LINKS_FILE, links).await
    }

    async fn find_registrars(&self) -> CoreResult<Vec<Registrar>> {
        Ok(self.read_typed(REGISTRARS_FILE).await)
    }

    async fn replace_registrars(&self, registrars: &[Registrar]) -> CoreResult<()> {
        self.write_typed(REGISTRARS_FILE, registrars).await
    }

    async fn delete_record(&self, kind: RecordKind, id: &str) -> CoreResult<bool> {
        match kind {
            RecordKind::Domains => {
                self.remove_by_id::<Domain>(DOMAINS_FILE, id, |d| d.id.as_str()).await
            }
            RecordKind::SoldDomains => {
                self.remove_by_id::<SoldDomain>(SOLD_DOMAINS_FILE, id, |d| d.id.as_str())
                    .await
            }
            RecordKind::FriendlyLinks => {
                self.remove_by_id::<FriendlyLink>(FRIENDLY_LINKS_FILE, id, |l| l.id.as_str())
                    .await
            }
        }
    }
}

#[async_trait]
impl SettingsRepository for JsonFileStore {
    async fn get_setting(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.get_all_settings().await?.remove(key))
    }

    async fn set_setting(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut settings = self.get_all_settings().await?;
        settings.insert(key.to_string(), value.to_string());
        self.write_typed(SITE_SETTINGS_FILE, &settings).await
    }

    /// Reads the settings object, or the legacy `[{key, value}]` row array.
    async fn get_all_settings(&self) -> CoreResult<SiteSettings> {
        let value = self.read(SITE_SETTINGS_FILE, Value::Null).await;
        let settings = match value {
            Value::Null => SiteSettings::new(),
            Value::Array(_) => serde_json::from_value::<Vec<LegacySettingRow>>(value)
                .map(|rows| {
                    rows.into_iter()
                        .map(|row| (row.key, row.value.unwrap_or_default()))
                        .collect()
                })
                .unwrap_or_else(|e| {
                    log::warn!("Ignoring malformed {SITE_SETTINGS_FILE}: {e}");
                    SiteSettings::new()
                }),
            other => serde_json::from_value(other).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed {SITE_SETTINGS_FILE}: {e}");
                SiteSettings::new()
            }),
        };
        Ok(settings)
    }

    async fn set_all_settings(&self, settings: &SiteSettings) -> CoreResult<()> {
        let mut merged = self.get_all_settings().await?;
        merged.extend(settings.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.write_typed(SITE_SETTINGS_FILE, &merged).await
    }

    async fn replace_all_settings(&self, settings: &SiteSettings) -> CoreResult<()> {
        self.write_typed(SITE_SETTINGS_FILE, settings).await
    }
}

#[async_trait]
impl StorageBackend for JsonFileStore {
    fn kind(&self) -> StorageKind {
        StorageKind::Json
    }

    /// Create the data directory and empty collection documents.
    async fn initialize(&self) -> CoreResult<()> {
        tokio::fs::create_dir_all(&self.data_dir).await.map_err(|e| {
            CoreError::StorageError(format!(
                "Failed to create data directory {}: {e}",
                self.data_dir.display()
            ))
        })?;

        for name in COLLECTION_FILES {
            let exists = tokio::fs::try_exists(self.data_dir.join(name))
                .await
                .unwrap_or(false);
            if !exists {
                self.write_typed(name, &Vec::<Value>::new()).await?;
                log::debug!("Created empty {name}");
            }
        }
        Ok(())
    }
}
