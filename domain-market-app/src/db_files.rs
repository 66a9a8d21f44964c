//! Raw database file backup and restore.
//!
//! Works on the `app-data.db` file itself, next to the JSON documents in the
//! data directory. Copies are not coordinated with open connections.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;

use domain_market_core::error::{CoreError, CoreResult};
use domain_market_core::types::DatabaseBackupInfo;
use domain_market_core::utils::datetime::file_stamp;

pub use crate::adapters::DATABASE_FILE;

const BACKUP_PREFIX: &str = "app-data-backup-";
const PRE_RESTORE_PREFIX: &str = "app-data-backup-before-restore-";

/// `app-data-backup-[before-restore-]<YYYYMMDD-HHMMSS[-mmm]>.db`
static BACKUP_NAME: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^app-data-backup-(?:before-restore-)?(\d{8}-\d{6}(?:-\d{3})?)\.db$").ok()
});

/// Whether `name` follows the database backup naming convention
#[must_use]
pub fn is_backup_name(name: &str) -> bool {
    BACKUP_NAME.as_ref().is_some_and(|re| re.is_match(name))
}

/// Timestamp part of a backup name, used for ordering
fn backup_stamp(name: &str) -> Option<&str> {
    BACKUP_NAME
        .as_ref()?
        .captures(name)?
        .get(1)
        .map(|m| m.as_str())
}

fn io_error(action: &str, path: &Path, e: &std::io::Error) -> CoreError {
    CoreError::StorageError(format!("Failed to {action} {}: {e}", path.display()))
}

/// Backup, restore and upload of the live database file.
pub struct DatabaseFileManager {
    data_dir: PathBuf,
}

impl DatabaseFileManager {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    #[must_use]
    pub fn live_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    async fn live_exists(&self) -> bool {
        tokio::fs::try_exists(self.live_path()).await.unwrap_or(false)
    }

    /// Bytes of the live database.
    pub async fn download_database_file(&self) -> CoreResult<Vec<u8>> {
        let path = self.live_path();
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CoreError::NotFound(DATABASE_FILE.to_string()))
            }
            Err(e) => Err(io_error("read", &path, &e)),
        }
    }

    /// Copy the live database to `app-data-backup-<ts>.db`.
    pub async fn create_backup(&self) -> CoreResult<String> {
        if !self.live_exists().await {
            return Err(CoreError::NotFound(DATABASE_FILE.to_string()));
        }
        let name = self.copy_live(BACKUP_PREFIX).await?;
        log::info!("Database backup created: {name}");
        Ok(name)
    }

    /// Backups in the data directory, newest first.
    pub async fn list_backups(&self) -> CoreResult<Vec<DatabaseBackupInfo>> {
        let mut entries = match tokio::fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("list", &self.data_dir, &e)),
        };

        let mut backups = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error("list", &self.data_dir, &e))?
        {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !is_backup_name(&name) {
                continue;
            }
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| io_error("stat", &entry.path(), &e))?;
            backups.push(DatabaseBackupInfo {
                name,
                size: metadata.len(),
                modified_at: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }

        backups.sort_by(|a, b| {
            backup_stamp(&b.name)
                .cmp(&backup_stamp(&a.name))
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(backups)
    }

    /// Replace the live database with a backup.
    ///
    /// The current live file (if any) is first copied to
    /// `app-data-backup-before-restore-<ts>.db`; that name is returned.
    pub async fn restore_from_backup(&self, name: &str) -> CoreResult<Option<String>> {
        if !is_backup_name(name) {
            return Err(CoreError::InvalidBackupName(name.to_string()));
        }
        let source = self.data_dir.join(name);
        if !tokio::fs::try_exists(&source).await.unwrap_or(false) {
            return Err(CoreError::NotFound(name.to_string()));
        }

        let safety = self.backup_before_restore().await?;
        tokio::fs::copy(&source, self.live_path())
            .await
            .map_err(|e| io_error("restore", &source, &e))?;

        log::info!("Database restored from {name}");
        Ok(safety)
    }

    /// Replace the live database with uploaded bytes.
    pub async fn upload_and_restore(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> CoreResult<Option<String>> {
        if !Path::new(file_name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("db"))
        {
            return Err(CoreError::UnsupportedFile(format!(
                "{file_name}: only .db files can be restored"
            )));
        }
        if bytes.is_empty() {
            return Err(CoreError::UnsupportedFile(format!("{file_name} is empty")));
        }

        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| io_error("create", &self.data_dir, &e))?;
        let safety = self.backup_before_restore().await?;
        let live = self.live_path();
        tokio::fs::write(&live, bytes)
            .await
            .map_err(|e| io_error("write", &live, &e))?;

        log::info!("Database replaced by upload {file_name} ({} bytes)", bytes.len());
        Ok(safety)
    }

    /// Delete a backup file. `Ok(false)` when it did not exist.
    ///
    /// Only names following the backup convention are accepted, so the live
    /// database can never be removed here.
    pub async fn delete_backup(&self, name: &str) -> CoreResult<bool> {
        if !is_backup_name(name) {
            return Err(CoreError::InvalidBackupName(name.to_string()));
        }
        let path = self.data_dir.join(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                log::info!("Database backup deleted: {name}");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error("delete", &path, &e)),
        }
    }

    async fn backup_before_restore(&self) -> CoreResult<Option<String>> {
        if !self.live_exists().await {
            return Ok(None);
        }
        let name = self.copy_live(PRE_RESTORE_PREFIX).await?;
        log::info!("Live database saved as {name} before restore");
        Ok(Some(name))
    }

    /// Copy the live file to `<prefix><ts>.db`, bumping the stamp on collision.
    async fn copy_live(&self, prefix: &str) -> CoreResult<String> {
        let mut at = Utc::now();
        let (name, target) = loop {
            let name = format!("{prefix}{}.db", file_stamp(at));
            let target = self.data_dir.join(&name);
            if !tokio::fs::try_exists(&target).await.unwrap_or(false) {
                break (name, target);
            }
            at += Duration::milliseconds(1);
        };

        let live = self.live_path();
        tokio::fs::copy(&live, &target)
            .await
            .map_err(|e| io_error("copy", &live, &e))?;
        Ok(name)
    }
}
