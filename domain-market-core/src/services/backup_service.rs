//! 备份导出服务

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::services::{BootstrapService, ServiceContext};
use crate::types::{
    AuthSnapshot, BackupDownload, BackupEnvelope, SnapshotInfo, SnapshotOptions,
    ENVELOPE_VERSION,
};
use crate::utils::datetime::snapshot_stamp;

const SNAPSHOT_PREFIX: &str = "backup-";
const DOWNLOAD_PREFIX: &str = "domain-market-backup-";

/// Prefixes of snapshot documents, including names written by older releases
const SNAPSHOT_PREFIXES: [&str; 4] = [
    SNAPSHOT_PREFIX,
    "static-backup-",
    "domain-backup-",
    "all-data-backup-",
];

/// Whether a document name looks like a persisted snapshot
#[must_use]
pub fn is_snapshot_name(name: &str) -> bool {
    name.ends_with(".json") && SNAPSHOT_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// 备份导出服务
pub struct BackupService {
    ctx: Arc<ServiceContext>,
    bootstrap: Arc<BootstrapService>,
}

impl BackupService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>, bootstrap: Arc<BootstrapService>) -> Self {
        Self { ctx, bootstrap }
    }

    /// Collect the current state into an envelope.
    pub async fn snapshot(&self, options: SnapshotOptions) -> CoreResult<BackupEnvelope> {
        self.bootstrap.ensure_ready().await?;
        let backend = &self.ctx.backend;

        let site_settings = if options.include_settings {
            Some(backend.get_all_settings().await?)
        } else {
            None
        };
        let auth = if options.include_auth {
            backend.get_credential().await?.map(|c| AuthSnapshot {
                password_hash: c.password_hash,
                last_updated: Some(c.last_updated),
                version: Some(c.version),
            })
        } else {
            None
        };

        Ok(BackupEnvelope {
            version: ENVELOPE_VERSION.to_string(),
            timestamp: Utc::now(),
            domains: Some(backend.find_domains().await?),
            sold_domains: Some(backend.find_sold_domains().await?),
            friendly_links: Some(backend.find_friendly_links().await?),
            registrars: Some(backend.find_registrars().await?),
            site_settings,
            auth,
        })
    }

    /// Serialize a snapshot for download without writing anything.
    pub async fn export_for_download(&self, options: SnapshotOptions) -> CoreResult<BackupDownload> {
        let envelope = self.snapshot(options).await?;
        let content = serde_json::to_string_pretty(&envelope)?;
        Ok(BackupDownload {
            content,
            suggested_filename: format!(
                "{DOWNLOAD_PREFIX}{}.json",
                snapshot_stamp(envelope.timestamp)
            ),
        })
    }

    /// Write a snapshot to the document store and return its name.
    pub async fn persist_snapshot(&self, options: SnapshotOptions) -> CoreResult<String> {
        let envelope = self.snapshot(options).await?;
        let document = serde_json::to_value(&envelope)?;
        let name = self.free_snapshot_name(envelope.timestamp).await;

        if !self.ctx.documents.write(&name, &document).await {
            return Err(CoreError::StorageError(format!(
                "failed to write snapshot {name}"
            )));
        }
        log::info!("Snapshot written: {name}");
        Ok(name)
    }

    /// Persisted snapshots, newest first.
    pub async fn list_snapshots(&self) -> Vec<SnapshotInfo> {
        let mut names: Vec<String> = self
            .ctx
            .documents
            .list()
            .await
            .into_iter()
            .filter(|n| is_snapshot_name(n))
            .collect();
        names.sort_by(|a, b| snapshot_sort_key(b).cmp(snapshot_sort_key(a)).then(b.cmp(a)));
        names.into_iter().map(|name| SnapshotInfo { name }).collect()
    }

    /// Raw contents of a persisted snapshot.
    pub async fn read_snapshot(&self, name: &str) -> CoreResult<Value> {
        if !is_snapshot_name(name) {
            return Err(CoreError::ValidationError(format!(
                "not a snapshot name: {name}"
            )));
        }
        match self.ctx.documents.read(name, Value::Null).await {
            Value::Null => Err(CoreError::NotFound(name.to_string())),
            value => Ok(value),
        }
    }

    /// `backup-<stamp>.json`, suffixed `-2`, `-3`... when taken within the same second.
    async fn free_snapshot_name(&self, at: DateTime<Utc>) -> String {
        let base = format!("{SNAPSHOT_PREFIX}{}", snapshot_stamp(at));
        let existing = self.ctx.documents.list().await;
        let mut name = format!("{base}.json");
        let mut n = 2;
        while existing.contains(&name) {
            name = format!("{base}-{n}.json");
            n += 1;
        }
        name
    }
}

/// Part of the name after the known prefix, so legacy names sort by date too.
fn snapshot_sort_key(name: &str) -> &str {
    SNAPSHOT_PREFIXES
        .iter()
        .find_map(|p| name.strip_prefix(p))
        .unwrap_or(name)
}
