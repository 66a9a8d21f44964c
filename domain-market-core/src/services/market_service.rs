//! 市场数据服务
//!
//! The one entry point callers use for record access. Every record call waits
//! for bootstrap first, then forwards to the backend chosen at startup.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::services::validation::prepare;
use crate::services::{BootstrapService, ServiceContext};
use crate::traits::{is_valid_document_name, StorageKind};
use crate::types::{
    Credential, Domain, DomainStatus, FriendlyLink, RecordKind, Registrar, SiteSettings,
    SoldDomain,
};

/// 市场数据服务
pub struct MarketService {
    ctx: Arc<ServiceContext>,
    bootstrap: Arc<BootstrapService>,
}

impl MarketService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>, bootstrap: Arc<BootstrapService>) -> Self {
        Self { ctx, bootstrap }
    }

    #[must_use]
    pub fn storage_kind(&self) -> StorageKind {
        self.ctx.storage_kind()
    }

    pub async fn get_credential(&self) -> CoreResult<Option<Credential>> {
        self.bootstrap.ensure_ready().await?;
        self.ctx.backend.get_credential().await
    }

    // ===== Domains =====

    pub async fn domains(&self) -> CoreResult<Vec<Domain>> {
        self.bootstrap.ensure_ready().await?;
        self.ctx.backend.find_domains().await
    }

    pub async fn replace_domains(&self, domains: &[Domain]) -> CoreResult<()> {
        self.bootstrap.ensure_ready().await?;
        let domains = prepare(domains, Utc::now())?;
        self.ctx.backend.replace_domains(&domains).await?;
        log::info!("Replaced domains ({} records)", domains.len());
        Ok(())
    }

    // ===== Sold domains =====

    pub async fn sold_domains(&self) -> CoreResult<Vec<SoldDomain>> {
        self.bootstrap.ensure_ready().await?;
        self.ctx.backend.find_sold_domains().await
    }

    pub async fn replace_sold_domains(&self, sold: &[SoldDomain]) -> CoreResult<()> {
        self.bootstrap.ensure_ready().await?;
        let sold = prepare(sold, Utc::now())?;
        self.ctx.backend.replace_sold_domains(&sold).await?;
        log::info!("Replaced sold domains ({} records)", sold.len());
        Ok(())
    }

    /// Sold collection plus entries derived from domains marked `sold`.
    ///
    /// A domain is only derived when no stored sale record has the same
    /// name and extension.
    pub async fn sold_view(&self) -> CoreResult<Vec<SoldDomain>> {
        self.bootstrap.ensure_ready().await?;
        let mut sold = self.ctx.backend.find_sold_domains().await?;
        let domains = self.ctx.backend.find_domains().await?;

        let recorded: HashSet<(String, String)> = sold
            .iter()
            .map(|s| (s.name.to_lowercase(), s.extension.to_lowercase()))
            .collect();

        sold.extend(
            domains
                .iter()
                .filter(|d| d.status == DomainStatus::Sold)
                .filter(|d| {
                    !recorded.contains(&(d.name.to_lowercase(), d.extension.to_lowercase()))
                })
                .map(SoldDomain::derived_from),
        );
        sold.sort_by(|a, b| b.sold_at.cmp(&a.sold_at).then_with(|| a.name.cmp(&b.name)));
        Ok(sold)
    }

    // ===== Friendly links =====

    pub async fn friendly_links(&self) -> CoreResult<Vec<FriendlyLink>> {
        self.bootstrap.ensure_ready().await?;
        self.ctx.backend.find_friendly_links().await
    }

    pub async fn replace_friendly_links(&self, links: &[FriendlyLink]) -> CoreResult<()> {
        self.bootstrap.ensure_ready().await?;
        let links = prepare(links, Utc::now())?;
        self.ctx.backend.replace_friendly_links(&links).await?;
        log::info!("Replaced friendly links ({} records)", links.len());
        Ok(())
    }

    // ===== Registrars =====

    pub async fn registrars(&self) -> CoreResult<Vec<Registrar>> {
        self.bootstrap.ensure_ready().await?;
        self.ctx.backend.find_registrars().await
    }

    pub async fn replace_registrars(&self, registrars: &[Registrar]) -> CoreResult<()> {
        self.bootstrap.ensure_ready().await?;
        let registrars = prepare(registrars, Utc::now())?;
        self.ctx.backend.replace_registrars(&registrars).await?;
        log::info!("Replaced registrars ({} records)", registrars.len());
        Ok(())
    }

    // ===== Site settings =====

    pub async fn site_settings(&self) -> CoreResult<SiteSettings> {
        self.bootstrap.ensure_ready().await?;
        self.ctx.backend.get_all_settings().await
    }

    /// Upsert every key of `settings`; keys not mentioned are kept.
    pub async fn replace_site_settings(&self, settings: &SiteSettings) -> CoreResult<()> {
        self.bootstrap.ensure_ready().await?;
        if settings.keys().any(|k| k.trim().is_empty()) {
            return Err(CoreError::ValidationError(
                "setting key must not be empty".to_string(),
            ));
        }
        self.ctx.backend.set_all_settings(settings).await
    }

    pub async fn setting(&self, key: &str) -> CoreResult<Option<String>> {
        self.bootstrap.ensure_ready().await?;
        self.ctx.backend.get_setting(key).await
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> CoreResult<()> {
        self.bootstrap.ensure_ready().await?;
        if key.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "setting key must not be empty".to_string(),
            ));
        }
        self.ctx.backend.set_setting(key, value).await
    }

    /// Delete one record by id. `Ok(false)` when nothing matched.
    pub async fn delete_record(&self, kind: RecordKind, id: &str) -> CoreResult<bool> {
        self.bootstrap.ensure_ready().await?;
        let deleted = self.ctx.backend.delete_record(kind, id).await?;
        if deleted {
            log::info!("Deleted {kind} record {id}");
        }
        Ok(deleted)
    }

    // ===== Named documents =====

    pub async fn read_document(&self, name: &str, default: Value) -> Value {
        self.ctx.documents.read(name, default).await
    }

    pub async fn write_document(&self, name: &str, document: &Value) -> bool {
        self.ctx.documents.write(name, document).await
    }

    pub async fn list_documents(&self) -> Vec<String> {
        self.ctx.documents.list().await
    }

    pub async fn delete_document(&self, name: &str) -> CoreResult<bool> {
        if !is_valid_document_name(name) {
            return Err(CoreError::ValidationError(format!(
                "invalid document name: {name}"
            )));
        }
        Ok(self.ctx.documents.delete(name).await)
    }
}
