//! 凭证管理服务
//!
//! Verifies, updates and resets the single admin password. The stored value
//! is always a PBKDF2 hash; legacy plain values are upgraded on first
//! successful login.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::crypto::{self, PasswordHasher};
use crate::error::{CoreError, CoreResult};
use crate::services::{BootstrapService, ServiceContext};
use crate::types::{Credential, PasswordUpdate};

/// Shortest accepted password (in characters)
pub const MIN_PASSWORD_LENGTH: usize = 6;

const DEFAULT_PASSWORD: &str = "admin123";
const DEFAULT_WRITE_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Credential seeding / update policy
#[derive(Debug, Clone)]
pub struct CredentialPolicy {
    /// Password seeded on bootstrap and restored by `reset`
    pub default_password: String,
    pub hasher: PasswordHasher,
    /// Total write attempts for `update` (first try included)
    pub max_write_attempts: u32,
    /// Fixed delay between write attempts
    pub retry_delay: Duration,
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self {
            default_password: DEFAULT_PASSWORD.to_string(),
            hasher: PasswordHasher::default(),
            max_write_attempts: DEFAULT_WRITE_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// 凭证管理服务
pub struct CredentialService {
    ctx: Arc<ServiceContext>,
    bootstrap: Arc<BootstrapService>,
    policy: CredentialPolicy,
    /// Last credential seen or written by this process
    cache: RwLock<Option<Credential>>,
}

impl CredentialService {
    #[must_use]
    pub fn new(
        ctx: Arc<ServiceContext>,
        bootstrap: Arc<BootstrapService>,
        policy: CredentialPolicy,
    ) -> Self {
        Self {
            ctx,
            bootstrap,
            policy,
            cache: RwLock::new(None),
        }
    }

    /// 验证密码
    ///
    /// The authoritative credential is read from storage; the cached copy is
    /// only used when that read fails.
    pub async fn verify(&self, candidate: &str) -> CoreResult<bool> {
        self.bootstrap.ensure_ready().await?;

        let credential = match self.ctx.backend.get_credential().await {
            Ok(Some(credential)) => {
                *self.cache.write().await = Some(credential.clone());
                Some(credential)
            }
            Ok(None) => {
                log::warn!("No credential stored, falling back to cached copy");
                self.cache.read().await.clone()
            }
            Err(e) => {
                log::warn!("Failed to load credential, falling back to cached copy: {e}");
                self.cache.read().await.clone()
            }
        };

        let Some(credential) = credential else {
            return Ok(false);
        };

        if crypto::is_encoded_hash(&credential.password_hash) {
            return match crypto::verify(candidate, &credential.password_hash) {
                Ok(matched) => Ok(matched),
                Err(e) => {
                    log::error!("Stored credential hash is unreadable: {e}");
                    Ok(false)
                }
            };
        }

        let matched = crypto::legacy_matches(candidate, &credential.password_hash);
        if matched {
            self.upgrade_legacy(candidate, &credential).await;
        }
        Ok(matched)
    }

    /// Replace a plain stored password with its hash (best effort).
    async fn upgrade_legacy(&self, password: &str, previous: &Credential) {
        let upgraded = Credential {
            password_hash: self.policy.hasher.hash(password),
            ..previous.clone()
        };
        match self.ctx.backend.save_credential(&upgraded).await {
            Ok(()) => {
                log::info!("Upgraded legacy plain-text credential to a hash");
                *self.cache.write().await = Some(upgraded);
            }
            Err(e) => log::warn!("Failed to upgrade legacy credential: {e}"),
        }
    }

    /// 更新密码
    ///
    /// Rejects passwords shorter than [`MIN_PASSWORD_LENGTH`] before touching
    /// storage. Each failed write is retried after a fixed delay; when every
    /// attempt fails the new password is kept only in this process and
    /// `PasswordUpdate::CachedOnly` is returned.
    pub async fn update(&self, new_password: &str) -> CoreResult<PasswordUpdate> {
        validate_password(new_password)?;
        self.bootstrap.ensure_ready().await?;

        let credential = Credential::new(
            self.policy.hasher.hash(new_password),
            chrono::Utc::now().timestamp_millis().to_string(),
        );

        let attempts = self.policy.max_write_attempts.max(1);
        for attempt in 1..=attempts {
            match self.ctx.backend.save_credential(&credential).await {
                Ok(()) => {
                    *self.cache.write().await = Some(credential);
                    log::info!("Admin password updated");
                    return Ok(PasswordUpdate::Persisted);
                }
                Err(e) => {
                    log::warn!("Password write attempt {attempt}/{attempts} failed: {e}");
                    if attempt < attempts {
                        tokio::time::sleep(self.policy.retry_delay).await;
                    }
                }
            }
        }

        log::error!(
            "Password could not be persisted after {attempts} attempts; kept in process cache only"
        );
        *self.cache.write().await = Some(credential);
        Ok(PasswordUpdate::CachedOnly)
    }

    /// 重置为默认密码
    pub async fn reset(&self) -> CoreResult<PasswordUpdate> {
        let default_password = self.policy.default_password.clone();
        self.update(&default_password).await
    }

    /// Credential metadata without the hash
    pub async fn info(&self) -> CoreResult<Option<(chrono::DateTime<chrono::Utc>, String)>> {
        self.bootstrap.ensure_ready().await?;
        Ok(self
            .ctx
            .backend
            .get_credential()
            .await?
            .map(|c| (c.last_updated, c.version)))
    }

    /// Forget the cached credential (after a restore replaced it).
    pub async fn invalidate_cache(&self) {
        *self.cache.write().await = None;
    }
}

fn validate_password(password: &str) -> CoreResult<()> {
    if password.is_empty() {
        return Err(CoreError::ValidationError("password must not be empty".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::ValidationError(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
