//! Site settings persistence abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::SiteSettings;

/// Key/value site settings Trait
///
/// Writes are upserts per key; keys absent from a `set_all_settings` call
/// are left untouched. `replace_all_settings` is the exception and drops them.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Get one setting
    async fn get_setting(&self, key: &str) -> CoreResult<Option<String>>;

    /// Upsert one setting
    async fn set_setting(&self, key: &str, value: &str) -> CoreResult<()>;

    /// Get every setting
    async fn get_all_settings(&self) -> CoreResult<SiteSettings>;

    /// Upsert every entry of `settings`
    async fn set_all_settings(&self, settings: &SiteSettings) -> CoreResult<()>;

    /// Make `settings` the complete stored set
    async fn replace_all_settings(&self, settings: &SiteSettings) -> CoreResult<()>;
}
