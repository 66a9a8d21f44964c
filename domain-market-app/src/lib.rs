//! Application bootstrap for Domain Market.
//!
//! Provides the concrete storage adapters, `StorageConfig` (backend
//! selection), `AppState` (service container) and `AppStateBuilder`, the
//! single place where the backend for a process is chosen.

pub mod adapters;
pub mod config;
pub mod db_files;
pub mod hooks;
pub mod scheduler;

use std::sync::Arc;

use tokio::task::JoinHandle;

use domain_market_core::error::CoreResult;
use domain_market_core::services::{
    AutoBackupService, BackupService, BootstrapService, CredentialService, MarketService,
    RestoreService, ServiceContext,
};
use domain_market_core::traits::{DocumentStore, StorageBackend, StorageKind};

use adapters::JsonFileStore;
use config::StorageConfig;
use db_files::DatabaseFileManager;
use scheduler::AutoBackupTask;

pub use hooks::{NoopStorageHooks, SelfHealReport, StorageHooks};

/// Platform-agnostic application state.
///
/// Every frontend constructs this once at startup via `AppStateBuilder`;
/// all services share the same backend handle and bootstrap flag.
pub struct AppState {
    pub config: StorageConfig,
    /// Service context (holds the storage adapters)
    pub ctx: Arc<ServiceContext>,
    pub bootstrap: Arc<BootstrapService>,
    pub market: MarketService,
    pub credentials: Arc<CredentialService>,
    pub backups: Arc<BackupService>,
    pub restore: RestoreService,
    pub auto_backup: Arc<AutoBackupService>,
    /// Raw `.db` file operations (SQLite deployments)
    pub db_files: DatabaseFileManager,
}

impl AppState {
    #[must_use]
    pub fn storage_kind(&self) -> StorageKind {
        self.ctx.storage_kind()
    }

    /// Run bootstrap now instead of on the first storage call.
    pub async fn ensure_ready(&self) -> CoreResult<()> {
        self.bootstrap.ensure_ready().await
    }

    /// Start the periodic auto-backup check on the current runtime.
    pub fn start_auto_backup(&self) -> JoinHandle<()> {
        AutoBackupTask::new(Arc::clone(&self.auto_backup)).spawn()
    }
}

/// Builder for `AppState`.
///
/// Without an explicit `backend`, the backend named by
/// `StorageConfig::storage` is created under `StorageConfig::data_dir`.
pub struct AppStateBuilder {
    config: StorageConfig,
    hooks: Arc<dyn StorageHooks>,
    backend: Option<Arc<dyn StorageBackend>>,
    documents: Option<Arc<dyn DocumentStore>>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            hooks: Arc::new(NoopStorageHooks),
            backend: None,
            documents: None,
        }
    }

    /// Storage event callbacks (SQLite self-heal).
    #[must_use]
    pub fn hooks(mut self, hooks: Arc<dyn StorageHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Use this backend instead of the configured one.
    #[must_use]
    pub fn backend(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use this document store instead of the data directory.
    #[must_use]
    pub fn documents(mut self, documents: Arc<dyn DocumentStore>) -> Self {
        self.documents = Some(documents);
        self
    }

    /// Build the `AppState`. Nothing touches storage until first use.
    ///
    /// # Errors
    /// Returns `CoreError::StorageUnready` if SQLite is requested but was not
    /// compiled in.
    pub fn build(self) -> CoreResult<AppState> {
        let Self {
            config,
            hooks,
            backend,
            documents,
        } = self;

        let file_store = Arc::new(JsonFileStore::new(&config.data_dir));
        let backend = match backend {
            Some(backend) => backend,
            None => select_backend(&config, &file_store, hooks)?,
        };
        let documents = documents.unwrap_or_else(|| file_store as Arc<dyn DocumentStore>);

        log::info!(
            "Storage backend: {} (data directory {})",
            backend.kind(),
            config.data_dir.display()
        );

        let ctx = Arc::new(ServiceContext::new(backend, documents));
        let credential_policy = config.credential_policy();
        let hasher = credential_policy.hasher;

        let bootstrap = Arc::new(BootstrapService::new(
            Arc::clone(&ctx),
            credential_policy.clone(),
        ));
        let market = MarketService::new(Arc::clone(&ctx), Arc::clone(&bootstrap));
        let credentials = Arc::new(CredentialService::new(
            Arc::clone(&ctx),
            Arc::clone(&bootstrap),
            credential_policy,
        ));
        let backups = Arc::new(BackupService::new(Arc::clone(&ctx), Arc::clone(&bootstrap)));
        let restore = RestoreService::new(
            Arc::clone(&ctx),
            Arc::clone(&bootstrap),
            Arc::clone(&credentials),
            hasher,
        );
        let auto_backup = Arc::new(AutoBackupService::new(
            Arc::clone(&ctx),
            Arc::clone(&backups),
            config.auto_backup_policy(),
        ));
        let db_files = DatabaseFileManager::new(&config.data_dir);

        Ok(AppState {
            config,
            ctx,
            bootstrap,
            market,
            credentials,
            backups,
            restore,
            auto_backup,
            db_files,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new(StorageConfig::default())
    }
}

fn select_backend(
    config: &StorageConfig,
    file_store: &Arc<JsonFileStore>,
    hooks: Arc<dyn StorageHooks>,
) -> CoreResult<Arc<dyn StorageBackend>> {
    match config.storage {
        StorageKind::Json => Ok(Arc::clone(file_store) as Arc<dyn StorageBackend>),
        StorageKind::Sqlite => sqlite_backend(config, hooks),
    }
}

#[cfg(feature = "sqlite-store")]
fn sqlite_backend(
    config: &StorageConfig,
    hooks: Arc<dyn StorageHooks>,
) -> CoreResult<Arc<dyn StorageBackend>> {
    let path = config.data_dir.join(adapters::DATABASE_FILE);
    Ok(Arc::new(adapters::SqliteStore::with_hooks(path, hooks)))
}

#[cfg(not(feature = "sqlite-store"))]
fn sqlite_backend(
    _config: &StorageConfig,
    _hooks: Arc<dyn StorageHooks>,
) -> CoreResult<Arc<dyn StorageBackend>> {
    Err(domain_market_core::error::CoreError::StorageUnready(
        "cannot load the SQL driver: built without the sqlite-store feature".to_string(),
    ))
}
