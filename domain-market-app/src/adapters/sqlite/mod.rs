//! SQLite-based store using `SeaORM`.
//!
//! `SqliteStore` implements every record trait against one local database
//! file. A connection is opened for each call and closed when it returns.
//! When the file turns out to be unreadable it is copied aside, recreated
//! empty, and the event is reported through `StorageHooks`.

mod credential_repo;
pub(crate) mod entity;
mod market_repo;
mod migration;
mod settings_repo;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;

use domain_market_core::error::{CoreError, CoreResult};
use domain_market_core::traits::{StorageBackend, StorageKind};
use domain_market_core::utils::datetime::{file_stamp, parse_rfc3339};

use crate::hooks::{NoopStorageHooks, SelfHealReport, StorageHooks};
use migration::Migrator;

const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";
const CORRUPT_PREFIX: &str = "app-data-corrupt-";

/// SQLite-backed record store.
pub struct SqliteStore {
    db_path: PathBuf,
    hooks: Arc<dyn StorageHooks>,
    last_heal: RwLock<Option<SelfHealReport>>,
}

impl SqliteStore {
    /// Create a store for `db_path`. Nothing is opened until the first call.
    #[must_use]
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self::with_hooks(db_path, Arc::new(NoopStorageHooks))
    }

    #[must_use]
    pub fn with_hooks(db_path: impl Into<PathBuf>, hooks: Arc<dyn StorageHooks>) -> Self {
        Self {
            db_path: db_path.into(),
            hooks,
            last_heal: RwLock::new(None),
        }
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Most recent self-heal performed by this store, if any.
    pub async fn last_self_heal(&self) -> Option<SelfHealReport> {
        self.last_heal.read().await.clone()
    }

    fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.db_path.display())
    }

    async fn open(&self) -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect(self.url()).await?;
        db.ping().await?;
        Ok(db)
    }

    /// Open a connection, recreating the database if it is unreadable.
    ///
    /// Only a bad header or an error SQLite reports as corruption leads to a
    /// rebuild; any other failure is returned as-is.
    pub(crate) async fn connect(&self) -> CoreResult<DatabaseConnection> {
        if let Some(reason) = self.detect_corruption().await? {
            return self.recover(reason).await;
        }
        match self.open().await {
            Ok(db) => Ok(db),
            Err(e) if is_corruption(&e) => self.recover(format!("connection failed: {e}")).await,
            Err(e) => Err(CoreError::StorageError(format!(
                "Failed to open database {}: {e}",
                self.db_path.display()
            ))),
        }
    }

    /// Check the file header. A missing or empty file is a fresh database.
    async fn detect_corruption(&self) -> CoreResult<Option<String>> {
        let mut file = match tokio::fs::File::open(&self.db_path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CoreError::StorageError(format!(
                    "Failed to open database file {}: {e}",
                    self.db_path.display()
                )));
            }
        };
        let mut header = Vec::with_capacity(SQLITE_HEADER.len());
        (&mut file)
            .take(SQLITE_HEADER.len() as u64)
            .read_to_end(&mut header)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to read database header: {e}")))?;
        if header.is_empty() || header.as_slice() == SQLITE_HEADER {
            Ok(None)
        } else {
            Ok(Some("invalid SQLite header".to_string()))
        }
    }

    /// Copy the unreadable file aside, recreate the schema and report it.
    async fn recover(&self, reason: String) -> CoreResult<DatabaseConnection> {
        log::warn!(
            "Database {} is unreadable ({reason}); recreating it",
            self.db_path.display()
        );

        let now = Utc::now();
        let corrupt_path = self
            .db_path
            .with_file_name(format!("{CORRUPT_PREFIX}{}.db", file_stamp(now)));
        // Nothing is deleted unless the copy exists.
        tokio::fs::copy(&self.db_path, &corrupt_path)
            .await
            .map_err(|e| {
                CoreError::StorageError(format!(
                    "Failed to copy unreadable database to {}: {e}; left in place",
                    corrupt_path.display()
                ))
            })?;

        for path in [
            self.db_path.clone(),
            sidecar(&self.db_path, "-wal"),
            sidecar(&self.db_path, "-shm"),
        ] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(CoreError::StorageError(format!(
                        "Failed to remove corrupt database {}: {e}",
                        path.display()
                    )));
                }
            }
        }

        let db = self
            .open()
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to recreate database: {e}")))?;
        Migrator::up(&db, None)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to run migrations: {e}")))?;

        let report = SelfHealReport {
            database: self.db_path.clone(),
            corrupt_copy: corrupt_path,
            reason,
            recovered_at: now,
        };
        log::warn!(
            "Database recreated; previous file kept at {}",
            report.corrupt_copy.display()
        );
        self.hooks.database_recovered(&report).await;
        *self.last_heal.write().await = Some(report);
        Ok(db)
    }
}

/// Close a per-call connection and pass the call's result through.
pub(crate) async fn finish<T>(db: DatabaseConnection, result: CoreResult<T>) -> CoreResult<T> {
    if let Err(e) = db.close().await {
        log::warn!("Failed to close SQLite connection: {e}");
    }
    result
}

pub(crate) fn db_error(action: &str) -> impl FnOnce(DbErr) -> CoreError + '_ {
    move |e| CoreError::StorageError(format!("Failed to {action}: {e}"))
}

/// Timestamps are stored as fixed-width RFC3339 so text order is time order.
pub(crate) fn to_db_time(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn from_db_time(column: &str, value: &str) -> CoreResult<DateTime<Utc>> {
    parse_rfc3339(value)
        .map_err(|e| CoreError::SerializationError(format!("Invalid {column}: {e}")))
}

pub(crate) fn from_db_time_opt(column: &str, value: Option<&str>) -> CoreResult<Option<DateTime<Utc>>> {
    value
        .filter(|v| !v.is_empty())
        .map(|v| from_db_time(column, v))
        .transpose()
}

/// `SQLITE_CORRUPT` and `SQLITE_NOTADB` as reported through `SeaORM`.
fn is_corruption(e: &DbErr) -> bool {
    let message = e.to_string().to_ascii_lowercase();
    ["file is not a database", "malformed", "corrupt"]
        .iter()
        .any(|needle| message.contains(needle))
}

fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

#[async_trait]
impl StorageBackend for SqliteStore {
    fn kind(&self) -> StorageKind {
        StorageKind::Sqlite
    }

    /// Create the parent directory and bring the schema up to date.
    async fn initialize(&self) -> CoreResult<()> {
        if let Some(parent) = self.db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::StorageError(format!("Failed to create directory: {e}")))?;
        }

        let db = self.connect().await?;
        let result = Migrator::up(&db, None)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to run migrations: {e}")));
        finish(db, result).await?;

        log::info!("SQLite store ready at {}", self.db_path.display());
        Ok(())
    }
}
