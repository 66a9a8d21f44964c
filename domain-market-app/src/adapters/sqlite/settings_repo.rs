//! `SettingsRepository` implementation for `SqliteStore`.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveValue::Set, DatabaseTransaction, EntityTrait, TransactionTrait};

use domain_market_core::error::CoreResult;
use domain_market_core::traits::SettingsRepository;
use domain_market_core::types::SiteSettings;

use super::entity::site_setting;
use super::{db_error, finish, to_db_time, SqliteStore};

/// Insert or overwrite one key inside an open transaction.
async fn upsert(txn: &DatabaseTransaction, key: &str, value: &str, now: &str) -> CoreResult<()> {
    let active_model = site_setting::ActiveModel {
        key: Set(key.to_string()),
        value: Set(value.to_string()),
        updated_at: Set(now.to_string()),
    };
    site_setting::Entity::insert(active_model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(site_setting::Column::Key)
                .update_columns([site_setting::Column::Value, site_setting::Column::UpdatedAt])
                .to_owned(),
        )
        .exec(txn)
        .await
        .map_err(db_error("save setting"))?;
    Ok(())
}

#[async_trait]
impl SettingsRepository for SqliteStore {
    async fn get_setting(&self, key: &str) -> CoreResult<Option<String>> {
        let db = self.connect().await?;
        let result = site_setting::Entity::find_by_id(key)
            .one(&db)
            .await
            .map_err(db_error("query setting"));
        Ok(finish(db, result).await?.map(|row| row.value))
    }

    async fn set_setting(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut settings = SiteSettings::new();
        settings.insert(key.to_string(), value.to_string());
        self.set_all_settings(&settings).await
    }

    async fn get_all_settings(&self) -> CoreResult<SiteSettings> {
        let db = self.connect().await?;
        let result = site_setting::Entity::find()
            .all(&db)
            .await
            .map_err(db_error("query settings"));
        let rows = finish(db, result).await?;
        Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
    }

    async fn set_all_settings(&self, settings: &SiteSettings) -> CoreResult<()> {
        let now = to_db_time(Utc::now());
        let db = self.connect().await?;
        let result = async {
            let txn = db.begin().await.map_err(db_error("begin transaction"))?;
            for (key, value) in settings {
                upsert(&txn, key, value, &now).await?;
            }
            txn.commit().await.map_err(db_error("commit settings"))
        }
        .await;
        finish(db, result).await
    }

    async fn replace_all_settings(&self, settings: &SiteSettings) -> CoreResult<()> {
        let now = to_db_time(Utc::now());
        let db = self.connect().await?;
        let result = async {
            let txn = db.begin().await.map_err(db_error("begin transaction"))?;
            site_setting::Entity::delete_many()
                .exec(&txn)
                .await
                .map_err(db_error("clear settings"))?;
            for (key, value) in settings {
                upsert(&txn, key, value, &now).await?;
            }
            txn.commit().await.map_err(db_error("commit settings"))
        }
        .await;
        finish(db, result).await
    }
}
