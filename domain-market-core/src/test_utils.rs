//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::crypto::PasswordHasher;
use crate::error::{CoreError, CoreResult};
use crate::services::{CredentialPolicy, ServiceContext};
use crate::traits::{
    is_valid_document_name, CredentialRepository, DocumentStore, MarketRepository,
    SettingsRepository, StorageBackend, StorageKind,
};
use crate::types::{
    Credential, Domain, FriendlyLink, RecordKind, Registrar, SiteSettings, SoldDomain,
};

/// Policy with a cheap hasher and no retry delay
pub fn test_policy() -> CredentialPolicy {
    CredentialPolicy {
        hasher: PasswordHasher::new(1_000),
        retry_delay: Duration::ZERO,
        ..CredentialPolicy::default()
    }
}

pub fn create_test_context() -> (
    Arc<ServiceContext>,
    Arc<MockBackend>,
    Arc<MockDocumentStore>,
) {
    let backend = Arc::new(MockBackend::new());
    let documents = Arc::new(MockDocumentStore::new());
    let ctx = Arc::new(ServiceContext::new(
        Arc::clone(&backend) as Arc<dyn StorageBackend>,
        Arc::clone(&documents) as Arc<dyn DocumentStore>,
    ));
    (ctx, backend, documents)
}

// ===== MockBackend =====

#[derive(Default)]
struct Tables {
    credential: Option<Credential>,
    domains: Vec<Domain>,
    sold_domains: Vec<SoldDomain>,
    friendly_links: Vec<FriendlyLink>,
    registrars: Vec<Registrar>,
    settings: SiteSettings,
}

/// In-memory backend with failure switches
#[derive(Default)]
pub struct MockBackend {
    tables: RwLock<Tables>,
    initialize_calls: AtomicUsize,
    fail_initialize: AtomicBool,
    credential_writes: AtomicUsize,
    collection_writes: AtomicUsize,
    fail_credential_writes: AtomicBool,
    failing_credential_writes: AtomicUsize,
    fail_credential_reads: AtomicBool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_initialize(&self, fail: bool) {
        self.fail_initialize.store(fail, Ordering::SeqCst);
    }

    pub fn fail_credential_writes(&self, fail: bool) {
        self.fail_credential_writes.store(fail, Ordering::SeqCst);
    }

    /// Fail only the next `n` credential writes.
    pub fn fail_next_credential_writes(&self, n: usize) {
        self.failing_credential_writes.store(n, Ordering::SeqCst);
    }

    pub fn fail_credential_reads(&self, fail: bool) {
        self.fail_credential_reads.store(fail, Ordering::SeqCst);
    }

    pub fn initialize_calls(&self) -> usize {
        self.initialize_calls.load(Ordering::SeqCst)
    }

    /// Credential write attempts, failed ones included
    pub fn credential_writes(&self) -> usize {
        self.credential_writes.load(Ordering::SeqCst)
    }

    /// Successful `replace_*` / settings writes
    pub fn collection_writes(&self) -> usize {
        self.collection_writes.load(Ordering::SeqCst)
    }

    pub async fn put_credential(&self, credential: Credential) {
        self.tables.write().await.credential = Some(credential);
    }

    pub async fn stored_credential(&self) -> Option<Credential> {
        self.tables.read().await.credential.clone()
    }

    pub async fn put_setting(&self, key: &str, value: &str) {
        self.tables
            .write()
            .await
            .settings
            .insert(key.to_string(), value.to_string());
    }

    pub async fn settings_snapshot(&self) -> SiteSettings {
        self.tables.read().await.settings.clone()
    }

    pub async fn put_domains(&self, domains: Vec<Domain>) {
        self.tables.write().await.domains = domains;
    }

    fn wrote_collection(&self) {
        self.collection_writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CredentialRepository for MockBackend {
    async fn get_credential(&self) -> CoreResult<Option<Credential>> {
        if self.fail_credential_reads.load(Ordering::SeqCst) {
            return Err(CoreError::StorageError("credential read failed".into()));
        }
        Ok(self.tables.read().await.credential.clone())
    }

    async fn save_credential(&self, credential: &Credential) -> CoreResult<()> {
        self.credential_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_credential_writes.load(Ordering::SeqCst) {
            return Err(CoreError::StorageError("credential write failed".into()));
        }
        let pending = self.failing_credential_writes.load(Ordering::SeqCst);
        if pending > 0 {
            self.failing_credential_writes
                .store(pending - 1, Ordering::SeqCst);
            return Err(CoreError::StorageError("transient write failure".into()));
        }
        self.tables.write().await.credential = Some(credential.clone());
        Ok(())
    }
}

#[async_trait]
impl MarketRepository for MockBackend {
    async fn find_domains(&self) -> CoreResult<Vec<Domain>> {
        Ok(self.tables.read().await.domains.clone())
    }

    async fn replace_domains(&self, domains: &[Domain]) -> CoreResult<()> {
        self.tables.write().await.domains = domains.to_vec();
        self.wrote_collection();
        Ok(())
    }

    async fn find_sold_domains(&self) -> CoreResult<Vec<SoldDomain>> {
        Ok(self.tables.read().await.sold_domains.clone())
    }

    async fn replace_sold_domains(&self, sold: &[SoldDomain]) -> CoreResult<()> {
        self.tables.write().await.sold_domains = sold.to_vec();
        self.wrote_collection();
        Ok(())
    }

    async fn find_friendly_links(&self) -> CoreResult<Vec<FriendlyLink>> {
        Ok(self.tables.read().await.friendly_links.clone())
    }

    async fn replace_friendly_links(&self, links: &[FriendlyLink]) -> CoreResult<()> {
        self.tables.write().await.friendly_links = links.to_vec();
        self.wrote_collection();
        Ok(())
    }

    async fn find_registrars(&self) -> CoreResult<Vec<Registrar>> {
        Ok(self.tables.read().await.registrars.clone())
    }

    async fn replace_registrars(&self, registrars: &[Registrar]) -> CoreResult<()> {
        self.tables.write().await.registrars = registrars.to_vec();
        self.wrote_collection();
        Ok(())
    }

    async fn delete_record(&self, kind: RecordKind, id: &str) -> CoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before;
        let after;
        match kind {
            RecordKind::Domains => {
                before = tables.domains.len();
                tables.domains.retain(|d| d.id != id);
                after = tables.domains.len();
            }
            RecordKind::SoldDomains => {
                before = tables.sold_domains.len();
                tables.sold_domains.retain(|d| d.id != id);
                after = tables.sold_domains.len();
            }
            RecordKind::FriendlyLinks => {
                before = tables.friendly_links.len();
                tables.friendly_links.retain(|l| l.id != id);
                after = tables.friendly_links.len();
            }
        }
        Ok(after < before)
    }
}

#[async_trait]
impl SettingsRepository for MockBackend {
    async fn get_setting(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.tables.read().await.settings.get(key).cloned())
    }

    async fn set_setting(&self, key: &str, value: &str) -> CoreResult<()> {
        self.put_setting(key, value).await;
        Ok(())
    }

    async fn get_all_settings(&self) -> CoreResult<SiteSettings> {
        Ok(self.settings_snapshot().await)
    }

    async fn set_all_settings(&self, settings: &SiteSettings) -> CoreResult<()> {
        let mut tables = self.tables.write().await;
        for (key, value) in settings {
            tables.settings.insert(key.clone(), value.clone());
        }
        self.wrote_collection();
        Ok(())
    }

    async fn replace_all_settings(&self, settings: &SiteSettings) -> CoreResult<()> {
        self.tables.write().await.settings = settings.clone();
        self.wrote_collection();
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn kind(&self) -> StorageKind {
        StorageKind::Json
    }

    async fn initialize(&self) -> CoreResult<()> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_initialize.load(Ordering::SeqCst) {
            return Err(CoreError::StorageError("data directory not writable".into()));
        }
        Ok(())
    }
}

// ===== MockDocumentStore =====

#[derive(Default)]
pub struct MockDocumentStore {
    documents: RwLock<BTreeMap<String, Value>>,
    fail_writes: AtomicBool,
}

impl MockDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn insert(&self, name: &str, document: Value) {
        self.documents
            .write()
            .await
            .insert(name.to_string(), document);
    }

    pub async fn names(&self) -> Vec<String> {
        self.documents.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl DocumentStore for MockDocumentStore {
    async fn read(&self, name: &str, default: Value) -> Value {
        self.documents
            .read()
            .await
            .get(name)
            .cloned()
            .unwrap_or(default)
    }

    async fn write(&self, name: &str, document: &Value) -> bool {
        if !is_valid_document_name(name) || self.fail_writes.load(Ordering::SeqCst) {
            return false;
        }
        self.insert(name, document.clone()).await;
        true
    }

    async fn list(&self) -> Vec<String> {
        self.names().await
    }

    async fn delete(&self, name: &str) -> bool {
        if !is_valid_document_name(name) {
            return false;
        }
        self.documents.write().await.remove(name);
        true
    }
}
