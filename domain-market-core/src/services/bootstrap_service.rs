//! 存储初始化服务

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::error::{CoreError, CoreResult};
use crate::services::{CredentialPolicy, ServiceContext};
use crate::types::{default_site_settings, Credential};

/// Version tag of the seeded credential
const INITIAL_CREDENTIAL_VERSION: &str = "initial";

/// One-time storage bootstrap, shared by every service of a process.
///
/// Only a successful run is memoized; after a failure the next caller
/// retries from scratch.
pub struct BootstrapService {
    ctx: Arc<ServiceContext>,
    policy: CredentialPolicy,
    ready: OnceCell<()>,
}

impl BootstrapService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>, policy: CredentialPolicy) -> Self {
        Self {
            ctx,
            policy,
            ready: OnceCell::new(),
        }
    }

    /// 确保存储已初始化
    pub async fn ensure_ready(&self) -> CoreResult<()> {
        self.ready
            .get_or_try_init(|| async {
                self.bootstrap().await.map_err(|e| match e {
                    CoreError::StorageUnready(_) => e,
                    other => CoreError::StorageUnready(other.to_string()),
                })
            })
            .await?;
        Ok(())
    }

    /// Whether bootstrap already completed in this process
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }

    async fn bootstrap(&self) -> CoreResult<()> {
        let kind = self.ctx.storage_kind();
        log::debug!("Bootstrapping {kind} storage");

        self.ctx.backend.initialize().await?;
        self.seed_credential().await?;
        self.seed_settings().await?;

        log::info!("Storage ready ({kind})");
        Ok(())
    }

    async fn seed_credential(&self) -> CoreResult<()> {
        if self.ctx.backend.get_credential().await?.is_some() {
            return Ok(());
        }
        let credential = Credential::new(
            self.policy.hasher.hash(&self.policy.default_password),
            INITIAL_CREDENTIAL_VERSION,
        );
        self.ctx.backend.save_credential(&credential).await?;
        log::info!("Seeded default admin credential");
        Ok(())
    }

    async fn seed_settings(&self) -> CoreResult<()> {
        let mut settings = self.ctx.backend.get_all_settings().await?;
        let before = settings.len();
        for (key, value) in default_site_settings() {
            settings.entry(key).or_insert(value);
        }
        if settings.len() != before {
            self.ctx.backend.set_all_settings(&settings).await?;
            log::debug!("Seeded {} default site settings", settings.len() - before);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto;
    use crate::test_utils::{create_test_context, test_policy};
    use crate::types::settings::SITE_NAME;

    #[tokio::test]
    async fn bootstrap_seeds_one_hashed_credential() {
        let (ctx, backend, _docs) = create_test_context();
        let bootstrap = BootstrapService::new(Arc::clone(&ctx), test_policy());

        bootstrap.ensure_ready().await.unwrap();

        let stored = backend.stored_credential().await.unwrap();
        assert_eq!(stored.version, INITIAL_CREDENTIAL_VERSION);
        assert!(crypto::is_encoded_hash(&stored.password_hash));
        assert!(crypto::verify("admin123", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn bootstrap_runs_once() {
        let (ctx, backend, _docs) = create_test_context();
        let bootstrap = BootstrapService::new(Arc::clone(&ctx), test_policy());

        bootstrap.ensure_ready().await.unwrap();
        bootstrap.ensure_ready().await.unwrap();

        assert!(bootstrap.is_ready());
        assert_eq!(backend.initialize_calls(), 1);
        assert_eq!(backend.credential_writes(), 1);
    }

    #[tokio::test]
    async fn existing_credential_and_settings_are_kept() {
        let (ctx, backend, _docs) = create_test_context();
        backend
            .put_credential(Credential::new("custom".into(), "7"))
            .await;
        backend
            .put_setting(SITE_NAME, "My Domains")
            .await;

        BootstrapService::new(Arc::clone(&ctx), test_policy())
            .ensure_ready()
            .await
            .unwrap();

        assert_eq!(backend.stored_credential().await.unwrap().version, "7");
        let settings = backend.settings_snapshot().await;
        assert_eq!(settings[SITE_NAME], "My Domains");
        assert!(settings.len() > 1);
    }

    #[tokio::test]
    async fn failure_is_not_memoized() {
        let (ctx, backend, _docs) = create_test_context();
        let bootstrap = BootstrapService::new(Arc::clone(&ctx), test_policy());

        backend.fail_initialize(true);
        let err = bootstrap.ensure_ready().await.unwrap_err();
        assert!(matches!(err, CoreError::StorageUnready(_)));
        assert!(!bootstrap.is_ready());

        backend.fail_initialize(false);
        bootstrap.ensure_ready().await.unwrap();
        assert_eq!(backend.initialize_calls(), 2);
    }
}
