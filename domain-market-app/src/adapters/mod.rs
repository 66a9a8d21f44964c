//! Storage adapters behind the core traits.
//!
//! `JsonFileStore` is always available. `SqliteStore` needs the
//! `sqlite-store` feature (on by default).

mod json_file_store;

pub use json_file_store::{
    JsonFileStore, CREDENTIALS_FILE, DOMAINS_FILE, FRIENDLY_LINKS_FILE, REGISTRARS_FILE,
    SITE_SETTINGS_FILE, SOLD_DOMAINS_FILE,
};

#[cfg(feature = "sqlite-store")]
mod sqlite;

#[cfg(feature = "sqlite-store")]
pub use sqlite::SqliteStore;

/// File name of the live database inside the data directory
pub const DATABASE_FILE: &str = "app-data.db";
