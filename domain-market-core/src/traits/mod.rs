//! Storage layer abstraction trait definition

mod credential_repository;
mod document_store;
mod market_repository;
mod settings_repository;
mod storage_backend;

pub use credential_repository::CredentialRepository;
pub use document_store::{is_valid_document_name, DocumentStore};
pub use market_repository::MarketRepository;
pub use settings_repository::SettingsRepository;
pub use storage_backend::{StorageBackend, StorageKind};
