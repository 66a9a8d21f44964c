//! Domain Market Core Library
//!
//! Platform-independent storage layer of the domain marketplace:
//! - record types (domains, sold domains, friendly links, registrars, settings)
//! - storage traits implemented by the JSON-file and SQLite backends
//! - services for bootstrap, market data, credentials, backup and restore
//!
//! Concrete backends live in `domain-market-app`; this crate never touches the
//! filesystem or a database directly.

pub mod crypto;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::ServiceContext;
pub use traits::{
    CredentialRepository, DocumentStore, MarketRepository, SettingsRepository, StorageBackend,
    StorageKind,
};
