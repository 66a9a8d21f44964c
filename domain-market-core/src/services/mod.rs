//! 业务逻辑服务层

mod auto_backup;
mod backup_service;
mod bootstrap_service;
mod credential_service;
mod market_service;
mod restore_service;
mod validation;

pub use auto_backup::{AutoBackupPolicy, AutoBackupService, AutoBackupState, AUTO_BACKUP_STATE_DOCUMENT};
pub use backup_service::{is_snapshot_name, BackupService};
pub use bootstrap_service::BootstrapService;
pub use credential_service::{CredentialPolicy, CredentialService, MIN_PASSWORD_LENGTH};
pub use market_service::MarketService;
pub use restore_service::{validate_envelope, RestoreService};

use std::sync::Arc;

use crate::traits::{DocumentStore, StorageBackend, StorageKind};

/// 服务上下文 - 持有所有依赖
///
/// 平台层需要创建此上下文，并注入平台特定的存储实现。
pub struct ServiceContext {
    /// Record storage backend (JSON files or SQLite)
    pub backend: Arc<dyn StorageBackend>,
    /// Named JSON documents (snapshots, scheduler state)
    pub documents: Arc<dyn DocumentStore>,
}

impl ServiceContext {
    /// 创建服务上下文
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>, documents: Arc<dyn DocumentStore>) -> Self {
        Self { backend, documents }
    }

    /// Backend selected for this process
    #[must_use]
    pub fn storage_kind(&self) -> StorageKind {
        self.backend.kind()
    }
}
