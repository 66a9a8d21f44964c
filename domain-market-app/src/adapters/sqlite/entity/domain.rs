//! `SeaORM` entity for the `domains` table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "domains")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub extension: String,
    pub status: String,
    pub registrar: Option<String>,
    pub registrar_icon: Option<String>,
    pub registered_at: Option<String>,
    pub expires_at: Option<String>,
    pub purchase_url: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    /// 0 / 1
    pub featured: i32,
    pub buyer: Option<String>,
    pub sold_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
