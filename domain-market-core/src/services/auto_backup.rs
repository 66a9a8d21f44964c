//! Auto-backup policy and its persisted state.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::services::{BackupService, ServiceContext};
use crate::types::SnapshotOptions;

/// Document holding the time of the last automatic snapshot
pub const AUTO_BACKUP_STATE_DOCUMENT: &str = "auto-backup-state.json";

const DEFAULT_THRESHOLD: Duration = Duration::from_secs(12 * 60 * 60);
const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// When an automatic snapshot is due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoBackupPolicy {
    /// Minimum age of the last snapshot before a new one is taken
    pub threshold: Duration,
    /// How often the scheduler asks `is_due`
    pub check_interval: Duration,
}

impl Default for AutoBackupPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }
}

impl AutoBackupPolicy {
    #[must_use]
    pub fn with_threshold_hours(hours: u64) -> Self {
        Self {
            threshold: Duration::from_secs(hours.max(1) * 60 * 60),
            ..Self::default()
        }
    }

    /// True when there is no previous snapshot or it is at least `threshold` old.
    ///
    /// A last-backup time in the future (clock moved back) counts as due.
    #[must_use]
    pub fn is_due(&self, last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(last) = last else {
            return true;
        };
        match (now - last).to_std() {
            Ok(elapsed) => elapsed >= self.threshold,
            Err(_) => true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AutoBackupState {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::datetime::option"
    )]
    pub last_backup_at: Option<DateTime<Utc>>,
}

/// Takes a snapshot when the policy says one is due.
pub struct AutoBackupService {
    ctx: Arc<ServiceContext>,
    backups: Arc<BackupService>,
    policy: AutoBackupPolicy,
}

impl AutoBackupService {
    #[must_use]
    pub fn new(
        ctx: Arc<ServiceContext>,
        backups: Arc<BackupService>,
        policy: AutoBackupPolicy,
    ) -> Self {
        Self {
            ctx,
            backups,
            policy,
        }
    }

    #[must_use]
    pub fn policy(&self) -> AutoBackupPolicy {
        self.policy
    }

    /// Persisted state; an unreadable document counts as "never".
    pub async fn state(&self) -> AutoBackupState {
        let value = self
            .ctx
            .documents
            .read(AUTO_BACKUP_STATE_DOCUMENT, Value::Null)
            .await;
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Run one check. Returns the snapshot name when one was written.
    pub async fn run_once(&self, now: DateTime<Utc>) -> CoreResult<Option<String>> {
        let state = self.state().await;
        if !self.policy.is_due(state.last_backup_at, now) {
            log::debug!("Auto-backup not due (last: {:?})", state.last_backup_at);
            return Ok(None);
        }

        let name = self.backups.persist_snapshot(SnapshotOptions::default()).await?;
        let state = AutoBackupState {
            last_backup_at: Some(now),
        };
        if !self
            .ctx
            .documents
            .write(AUTO_BACKUP_STATE_DOCUMENT, &serde_json::to_value(&state)?)
            .await
        {
            return Err(CoreError::StorageError(format!(
                "snapshot {name} written but {AUTO_BACKUP_STATE_DOCUMENT} could not be saved"
            )));
        }
        log::info!("Auto-backup created: {name}");
        Ok(Some(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::BootstrapService;
    use crate::test_utils::{create_test_context, test_policy};
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn policy_due_rules() {
        let policy = AutoBackupPolicy::default();
        assert!(policy.is_due(None, at(0)));
        assert!(!policy.is_due(Some(at(0)), at(11)));
        assert!(policy.is_due(Some(at(0)), at(12)));
        assert!(policy.is_due(Some(at(12)), at(0)));
    }

    #[test]
    fn threshold_hours_are_clamped() {
        assert_eq!(
            AutoBackupPolicy::with_threshold_hours(0).threshold,
            Duration::from_secs(3600)
        );
        assert_eq!(
            AutoBackupPolicy::with_threshold_hours(24).check_interval,
            DEFAULT_CHECK_INTERVAL
        );
    }

    #[tokio::test]
    async fn run_once_backs_up_then_waits_for_threshold() {
        let (ctx, _backend, docs) = create_test_context();
        let bootstrap = Arc::new(BootstrapService::new(Arc::clone(&ctx), test_policy()));
        let backups = Arc::new(BackupService::new(Arc::clone(&ctx), bootstrap));
        let auto = AutoBackupService::new(Arc::clone(&ctx), backups, AutoBackupPolicy::default());

        assert!(auto.run_once(at(0)).await.unwrap().is_some());
        assert_eq!(auto.state().await.last_backup_at, Some(at(0)));
        assert!(auto.run_once(at(6)).await.unwrap().is_none());
        assert!(auto.run_once(at(13)).await.unwrap().is_some());

        let names = docs.names().await;
        assert!(names.contains(&AUTO_BACKUP_STATE_DOCUMENT.to_string()));
        assert_eq!(names.len(), 3);
    }
}
