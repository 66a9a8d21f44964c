//! `SeaORM` entities for `SqliteStore`.

pub mod credential;
pub mod domain;
pub mod friendly_link;
pub mod registrar;
pub mod site_setting;
pub mod sold_domain;
