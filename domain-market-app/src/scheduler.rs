//! Server-side auto-backup schedule.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use domain_market_core::services::AutoBackupService;

/// Asks `AutoBackupService` every `check_interval` whether a snapshot is due.
///
/// The first check runs immediately. Failures are logged and retried on the
/// next tick; the task runs until its handle is aborted.
pub struct AutoBackupTask {
    service: Arc<AutoBackupService>,
}

impl AutoBackupTask {
    #[must_use]
    pub fn new(service: Arc<AutoBackupService>) -> Self {
        Self { service }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        let policy = self.service.policy();
        let mut interval = tokio::time::interval(policy.check_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        log::info!(
            "Auto-backup scheduled: check every {:?}, threshold {:?}",
            policy.check_interval,
            policy.threshold
        );

        loop {
            interval.tick().await;
            match self.service.run_once(Utc::now()).await {
                Ok(Some(name)) => log::info!("Scheduled snapshot written: {name}"),
                Ok(None) => {}
                Err(e) if e.is_expected() => log::warn!("Auto-backup skipped: {e}"),
                Err(e) => log::error!("Auto-backup failed: {e}"),
            }
        }
    }
}
