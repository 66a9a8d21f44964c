//! 备份恢复服务

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::crypto::{self, PasswordHasher};
use crate::error::{CoreError, CoreResult};
use crate::services::validation::{prepare, Validate};
use crate::services::{is_snapshot_name, BootstrapService, CredentialService, ServiceContext};
use crate::types::{BackupEnvelope, Credential, RestoreReport, RestoredSection, CREDENTIAL_ID};

const MISSING_FIELDS: &str = "missing required envelope fields";

/// Check the shape of an envelope before anything is written.
///
/// Requires an object carrying `version` and `timestamp` and at least one of
/// `domains`, `soldDomains`, `friendlyLinks` (arrays) or `siteSettings`
/// (object).
pub fn validate_envelope(value: &Value) -> CoreResult<()> {
    let Some(object) = value.as_object() else {
        return Err(CoreError::Restore("backup is not a JSON object".to_string()));
    };
    if !object.contains_key("version") || !object.contains_key("timestamp") {
        return Err(CoreError::Restore(MISSING_FIELDS.to_string()));
    }

    let has_collection = ["domains", "soldDomains", "friendlyLinks"]
        .iter()
        .any(|key| object.get(*key).is_some_and(Value::is_array));
    let has_settings = object.get("siteSettings").is_some_and(Value::is_object);

    if has_collection || has_settings {
        Ok(())
    } else {
        Err(CoreError::Restore(MISSING_FIELDS.to_string()))
    }
}

/// 备份恢复服务
pub struct RestoreService {
    ctx: Arc<ServiceContext>,
    bootstrap: Arc<BootstrapService>,
    credentials: Arc<CredentialService>,
    hasher: PasswordHasher,
}

impl RestoreService {
    #[must_use]
    pub fn new(
        ctx: Arc<ServiceContext>,
        bootstrap: Arc<BootstrapService>,
        credentials: Arc<CredentialService>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            ctx,
            bootstrap,
            credentials,
            hasher,
        }
    }

    /// Apply a backup envelope.
    ///
    /// Each present section fully replaces the stored one. Every record is
    /// checked before the first write; a storage failure part-way leaves
    /// earlier sections applied.
    pub async fn restore(&self, value: &Value) -> CoreResult<RestoreReport> {
        validate_envelope(value)?;
        let envelope: BackupEnvelope = serde_json::from_value(value.clone())
            .map_err(|e| CoreError::Restore(format!("malformed backup: {e}")))?;

        let now = Utc::now();
        let domains = checked(envelope.domains.as_deref(), now)?;
        let sold = checked(envelope.sold_domains.as_deref(), now)?;
        let links = checked(envelope.friendly_links.as_deref(), now)?;
        let registrars = checked(envelope.registrars.as_deref(), now)?;
        if let Some(settings) = &envelope.site_settings {
            if settings.keys().any(|k| k.trim().is_empty()) {
                return Err(CoreError::Restore(
                    "backup carries an empty setting key".to_string(),
                ));
            }
        }

        self.bootstrap.ensure_ready().await?;
        let backend = &self.ctx.backend;
        let mut sections = Vec::new();

        if let Some(domains) = domains {
            backend.replace_domains(&domains).await?;
            sections.push(RestoredSection::Domains);
        }
        if let Some(sold) = sold {
            backend.replace_sold_domains(&sold).await?;
            sections.push(RestoredSection::SoldDomains);
        }
        if let Some(links) = links {
            backend.replace_friendly_links(&links).await?;
            sections.push(RestoredSection::FriendlyLinks);
        }
        if let Some(registrars) = registrars {
            backend.replace_registrars(&registrars).await?;
            sections.push(RestoredSection::Registrars);
        }
        if let Some(settings) = &envelope.site_settings {
            backend.replace_all_settings(settings).await?;
            sections.push(RestoredSection::SiteSettings);
        }
        if let Some(auth) = envelope.auth {
            let password_hash = if crypto::is_encoded_hash(&auth.password_hash) {
                auth.password_hash
            } else {
                log::warn!("Backup carries a plain-text password; storing its hash instead");
                self.hasher.hash(&auth.password_hash)
            };
            let credential = Credential {
                id: CREDENTIAL_ID.to_string(),
                password_hash,
                last_updated: auth.last_updated.unwrap_or(now),
                version: auth
                    .version
                    .unwrap_or_else(|| now.timestamp_millis().to_string()),
            };
            backend.save_credential(&credential).await?;
            self.credentials.invalidate_cache().await;
            sections.push(RestoredSection::Auth);
        }

        log::info!(
            "Restored backup v{} from {} ({} sections)",
            envelope.version,
            envelope.timestamp,
            sections.len()
        );
        Ok(RestoreReport {
            sections,
            reload_required: true,
        })
    }

    /// Restore a snapshot previously written to the document store.
    pub async fn restore_document(&self, name: &str) -> CoreResult<RestoreReport> {
        if !is_snapshot_name(name) {
            return Err(CoreError::ValidationError(format!(
                "not a snapshot name: {name}"
            )));
        }
        match self.ctx.documents.read(name, Value::Null).await {
            Value::Null => Err(CoreError::NotFound(name.to_string())),
            value => self.restore(&value).await,
        }
    }
}

fn checked<R: Validate>(
    records: Option<&[R]>,
    now: chrono::DateTime<Utc>,
) -> CoreResult<Option<Vec<R>>> {
    records
        .map(|records| prepare(records, now))
        .transpose()
        .map_err(|e| CoreError::Restore(e.to_string()))
}
