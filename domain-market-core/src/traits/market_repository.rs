//! Market collections persistence abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{Domain, FriendlyLink, RecordKind, Registrar, SoldDomain};

/// Market data repository Trait
///
/// Every `replace_*` method is a **full replace**: all stored records of the
/// collection are discarded and the supplied slice becomes the new content.
/// There are no partial-update methods on purpose.
///
/// Platform implementation:
/// - JSON files: `JsonFileStore`
/// - SQLite: `SqliteStore` (`SeaORM`)
#[async_trait]
pub trait MarketRepository: Send + Sync {
    /// All domains, featured first then by name (SQL backend)
    async fn find_domains(&self) -> CoreResult<Vec<Domain>>;

    /// Replace the domain collection
    async fn replace_domains(&self, domains: &[Domain]) -> CoreResult<()>;

    /// All sale records, most recent sale first (SQL backend)
    async fn find_sold_domains(&self) -> CoreResult<Vec<SoldDomain>>;

    /// Replace the sold-domain collection
    async fn replace_sold_domains(&self, sold: &[SoldDomain]) -> CoreResult<()>;

    /// All friendly links in stored order
    async fn find_friendly_links(&self) -> CoreResult<Vec<FriendlyLink>>;

    /// Replace the friendly-link collection
    async fn replace_friendly_links(&self, links: &[FriendlyLink]) -> CoreResult<()>;

    /// All registrars, by name
    async fn find_registrars(&self) -> CoreResult<Vec<Registrar>>;

    /// Replace the registrar collection
    async fn replace_registrars(&self, registrars: &[Registrar]) -> CoreResult<()>;

    /// Delete one record by id
    ///
    /// # Returns
    /// * `Ok(true)` - a record was removed
    /// * `Ok(false)` - no record with that id
    async fn delete_record(&self, kind: RecordKind, id: &str) -> CoreResult<bool>;
}
