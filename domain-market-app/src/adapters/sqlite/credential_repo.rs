//! `CredentialRepository` implementation for `SqliteStore`.

use async_trait::async_trait;
use sea_orm::{ActiveValue::Set, EntityTrait, TransactionTrait};

use domain_market_core::error::CoreResult;
use domain_market_core::traits::CredentialRepository;
use domain_market_core::types::{Credential, CREDENTIAL_ID};

use super::entity::credential;
use super::{db_error, finish, from_db_time, to_db_time, SqliteStore};

impl credential::Model {
    fn into_credential(self) -> CoreResult<Credential> {
        Ok(Credential {
            last_updated: from_db_time("last_updated", &self.last_updated)?,
            id: self.id,
            password_hash: self.password_hash,
            version: self.version,
        })
    }
}

#[async_trait]
impl CredentialRepository for SqliteStore {
    async fn get_credential(&self) -> CoreResult<Option<Credential>> {
        let db = self.connect().await?;
        let result = credential::Entity::find_by_id(CREDENTIAL_ID)
            .one(&db)
            .await
            .map_err(db_error("query credential"));
        let row = finish(db, result).await?;
        row.map(credential::Model::into_credential).transpose()
    }

    async fn save_credential(&self, credential: &Credential) -> CoreResult<()> {
        let active_model = credential::ActiveModel {
            id: Set(CREDENTIAL_ID.to_string()),
            password_hash: Set(credential.password_hash.clone()),
            last_updated: Set(to_db_time(credential.last_updated)),
            version: Set(credential.version.clone()),
        };

        let db = self.connect().await?;
        let result = async {
            let txn = db.begin().await.map_err(db_error("begin transaction"))?;
            credential::Entity::insert(active_model)
                .on_conflict(
                    sea_orm::sea_query::OnConflict::column(credential::Column::Id)
                        .update_columns([
                            credential::Column::PasswordHash,
                            credential::Column::LastUpdated,
                            credential::Column::Version,
                        ])
                        .to_owned(),
                )
                .exec(&txn)
                .await
                .map_err(db_error("save credential"))?;
            txn.commit().await.map_err(db_error("commit credential"))
        }
        .await;
        finish(db, result).await?;

        log::info!("Credential saved (version {})", credential.version);
        Ok(())
    }
}
