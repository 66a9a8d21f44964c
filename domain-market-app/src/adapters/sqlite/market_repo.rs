//! `MarketRepository` implementation for `SqliteStore`.
//!
//! Every `replace_*` runs inside one transaction: delete all rows, then
//! insert the supplied records in order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::Set, EntityTrait, QueryOrder, TransactionTrait};

use domain_market_core::error::CoreResult;
use domain_market_core::traits::MarketRepository;
use domain_market_core::types::{
    Domain, DomainStatus, FriendlyLink, RecordKind, Registrar, SoldDomain,
};

use super::entity::{domain, friendly_link, registrar, sold_domain};
use super::{db_error, finish, from_db_time_opt, to_db_time, SqliteStore};

fn stamp(value: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    to_db_time(value.unwrap_or(now))
}

fn opt_time(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(to_db_time)
}

// ===== Row conversions =====

impl domain::Model {
    fn into_domain(self) -> CoreResult<Domain> {
        Ok(Domain {
            registered_at: from_db_time_opt("registered_at", self.registered_at.as_deref())?,
            expires_at: from_db_time_opt("expires_at", self.expires_at.as_deref())?,
            sold_at: from_db_time_opt("sold_at", self.sold_at.as_deref())?,
            created_at: from_db_time_opt("created_at", Some(self.created_at.as_str()))?,
            updated_at: from_db_time_opt("updated_at", Some(self.updated_at.as_str()))?,
            status: DomainStatus::from_storage(&self.status),
            featured: self.featured != 0,
            id: self.id,
            name: self.name,
            extension: self.extension,
            registrar: self.registrar,
            registrar_icon: self.registrar_icon,
            purchase_url: self.purchase_url,
            price: self.price,
            description: self.description,
            buyer: self.buyer,
        })
    }
}

fn domain_to_active_model(d: &Domain, now: DateTime<Utc>) -> domain::ActiveModel {
    domain::ActiveModel {
        id: Set(d.id.clone()),
        name: Set(d.name.clone()),
        extension: Set(d.extension.clone()),
        status: Set(d.status.as_str().to_string()),
        registrar: Set(d.registrar.clone()),
        registrar_icon: Set(d.registrar_icon.clone()),
        registered_at: Set(opt_time(d.registered_at)),
        expires_at: Set(opt_time(d.expires_at)),
        purchase_url: Set(d.purchase_url.clone()),
        price: Set(d.price.clone()),
        description: Set(d.description.clone()),
        featured: Set(i32::from(d.featured)),
        buyer: Set(d.buyer.clone()),
        sold_at: Set(opt_time(d.sold_at)),
        created_at: Set(stamp(d.created_at, now)),
        updated_at: Set(stamp(d.updated_at, now)),
    }
}

impl sold_domain::Model {
    fn into_sold_domain(self) -> CoreResult<SoldDomain> {
        Ok(SoldDomain {
            sold_at: from_db_time_opt("sold_at", self.sold_at.as_deref())?,
            created_at: from_db_time_opt("created_at", Some(self.created_at.as_str()))?,
            updated_at: from_db_time_opt("updated_at", Some(self.updated_at.as_str()))?,
            id: self.id,
            name: self.name,
            extension: self.extension,
            price: self.price,
            buyer: self.buyer,
            registrar: self.registrar,
        })
    }
}

fn sold_to_active_model(s: &SoldDomain, now: DateTime<Utc>) -> sold_domain::ActiveModel {
    sold_domain::ActiveModel {
        id: Set(s.id.clone()),
        name: Set(s.name.clone()),
        extension: Set(s.extension.clone()),
        price: Set(s.price.clone()),
        buyer: Set(s.buyer.clone()),
        sold_at: Set(opt_time(s.sold_at)),
        registrar: Set(s.registrar.clone()),
        created_at: Set(stamp(s.created_at, now)),
        updated_at: Set(stamp(s.updated_at, now)),
    }
}

impl friendly_link::Model {
    fn into_friendly_link(self) -> CoreResult<FriendlyLink> {
        Ok(FriendlyLink {
            created_at: from_db_time_opt("created_at", Some(self.created_at.as_str()))?,
            updated_at: from_db_time_opt("updated_at", Some(self.updated_at.as_str()))?,
            id: self.id,
            name: self.name,
            url: self.url,
            description: self.description,
        })
    }
}

fn link_to_active_model(
    l: &FriendlyLink,
    position: usize,
    now: DateTime<Utc>,
) -> friendly_link::ActiveModel {
    friendly_link::ActiveModel {
        id: Set(l.id.clone()),
        name: Set(l.name.clone()),
        url: Set(l.url.clone()),
        description: Set(l.description.clone()),
        position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
        created_at: Set(stamp(l.created_at, now)),
        updated_at: Set(stamp(l.updated_at, now)),
    }
}

impl registrar::Model {
    fn into_registrar(self) -> CoreResult<Registrar> {
        Ok(Registrar {
            created_at: from_db_time_opt("created_at", Some(self.created_at.as_str()))?,
            updated_at: from_db_time_opt("updated_at", Some(self.updated_at.as_str()))?,
            name: self.name,
            website: self.website,
            logo: self.logo,
            api_key: self.api_key,
            description: self.description,
        })
    }
}

fn registrar_to_active_model(r: &Registrar, now: DateTime<Utc>) -> registrar::ActiveModel {
    registrar::ActiveModel {
        name: Set(r.name.clone()),
        website: Set(r.website.clone()),
        logo: Set(r.logo.clone()),
        api_key: Set(r.api_key.clone()),
        description: Set(r.description.clone()),
        created_at: Set(stamp(r.created_at, now)),
        updated_at: Set(stamp(r.updated_at, now)),
    }
}

#[async_trait]
impl MarketRepository for SqliteStore {
    async fn find_domains(&self) -> CoreResult<Vec<Domain>> {
        let db = self.connect().await?;
        let result = domain::Entity::find()
            .order_by_desc(domain::Column::Featured)
            .order_by_asc(domain::Column::Name)
            .all(&db)
            .await
            .map_err(db_error("query domains"));
        let rows = finish(db, result).await?;
        rows.into_iter().map(domain::Model::into_domain).collect()
    }

    async fn replace_domains(&self, domains: &[Domain]) -> CoreResult<()> {
        let now = Utc::now();
        let db = self.connect().await?;
        let result = async {
            let txn = db.begin().await.map_err(db_error("begin transaction"))?;
            domain::Entity::delete_many()
                .exec(&txn)
                .await
                .map_err(db_error("clear domains"))?;
            for d in domains {
                domain::Entity::insert(domain_to_active_model(d, now))
                    .exec(&txn)
                    .await
                    .map_err(db_error("insert domain"))?;
            }
            txn.commit().await.map_err(db_error("commit domains"))
        }
        .await;
        finish(db, result).await?;

        log::debug!("Stored {} domains in SQLite", domains.len());
        Ok(())
    }

    /// Newest sale first; records without a sale date last.
    async fn find_sold_domains(&self) -> CoreResult<Vec<SoldDomain>> {
        let db = self.connect().await?;
        let result = sold_domain::Entity::find()
            .order_by_desc(sold_domain::Column::SoldAt)
            .order_by_asc(sold_domain::Column::Name)
            .all(&db)
            .await
            .map_err(db_error("query sold domains"));
        let rows = finish(db, result).await?;
        rows.into_iter()
            .map(sold_domain::Model::into_sold_domain)
            .collect()
    }

    async fn replace_sold_domains(&self, sold: &[SoldDomain]) -> CoreResult<()> {
        let now = Utc::now();
        let db = self.connect().await?;
        let result = async {
            let txn = db.begin().await.map_err(db_error("begin transaction"))?;
            sold_domain::Entity::delete_many()
                .exec(&txn)
                .await
                .map_err(db_error("clear sold domains"))?;
            for s in sold {
                sold_domain::Entity::insert(sold_to_active_model(s, now))
                    .exec(&txn)
                    .await
                    .map_err(db_error("insert sold domain"))?;
            }
            txn.commit().await.map_err(db_error("commit sold domains"))
        }
        .await;
        finish(db, result).await?;

        log::debug!("Stored {} sold domains in SQLite", sold.len());
        Ok(())
    }

    async fn find_friendly_links(&self) -> CoreResult<Vec<FriendlyLink>> {
        let db = self.connect().await?;
        let result = friendly_link::Entity::find()
            .order_by_asc(friendly_link::Column::Position)
            .all(&db)
            .await
            .map_err(db_error("query friendly links"));
        let rows = finish(db, result).await?;
        rows.into_iter()
            .map(friendly_link::Model::into_friendly_link)
            .collect()
    }

    async fn replace_friendly_links(&self, links: &[FriendlyLink]) -> CoreResult<()> {
        let now = Utc::now();
        let db = self.connect().await?;
        let result = async {
            let txn = db.begin().await.map_err(db_error("begin transaction"))?;
            friendly_link::Entity::delete_many()
                .exec(&txn)
                .await
                .map_err(db_error("clear friendly links"))?;
            for (position, link) in links.iter().enumerate() {
                friendly_link::Entity::insert(link_to_active_model(link, position, now))
                    .exec(&txn)
                    .await
                    .map_err(db_error("insert friendly link"))?;
            }
            txn.commit().await.map_err(db_error("commit friendly links"))
        }
        .await;
        finish(db, result).await?;

        log::debug!("Stored {} friendly links in SQLite", links.len());
        Ok(())
    }

    async fn find_registrars(&self) -> CoreResult<Vec<Registrar>> {
        let db = self.connect().await?;
        let result = registrar::Entity::find()
            .order_by_asc(registrar::Column::Name)
            .all(&db)
            .await
            .map_err(db_error("query registrars"));
        let rows = finish(db, result).await?;
        rows.into_iter()
            .map(registrar::Model::into_registrar)
            .collect()
    }

    async fn replace_registrars(&self, registrars: &[Registrar]) -> CoreResult<()> {
        let now = Utc::now();
        let db = self.connect().await?;
        let result = async {
            let txn = db.begin().await.map_err(db_error("begin transaction"))?;
            registrar::Entity::delete_many()
                .exec(&txn)
                .await
                .map_err(db_error("clear registrars"))?;
            for r in registrars {
                registrar::Entity::insert(registrar_to_active_model(r, now))
                    .exec(&txn)
                    .await
                    .map_err(db_error("insert registrar"))?;
            }
            txn.commit().await.map_err(db_error("commit registrars"))
        }
        .await;
        finish(db, result).await?;

        log::debug!("Stored {} registrars in SQLite", registrars.len());
        Ok(())
    }

    async fn delete_record(&self, kind: RecordKind, id: &str) -> CoreResult<bool> {
        let db = self.connect().await?;
        let result = match kind {
            RecordKind::Domains => domain::Entity::delete_by_id(id).exec(&db).await,
            RecordKind::SoldDomains => sold_domain::Entity::delete_by_id(id).exec(&db).await,
            RecordKind::FriendlyLinks => friendly_link::Entity::delete_by_id(id).exec(&db).await,
        }
        .map(|r| r.rows_affected > 0)
        .map_err(db_error("delete record"));
        finish(db, result).await
    }
}
