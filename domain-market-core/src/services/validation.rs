//! Record checks applied before any collection is replaced.
//!
//! `MarketService` and `RestoreService` both run records through
//! `prepare`, so restored data meets the same rules as edited data.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::types::{
    ensure_unique_keys, stamp_records, Domain, FriendlyLink, Record, Registrar, SoldDomain,
};

/// Per-record rules beyond key uniqueness
pub(crate) trait Validate: Record {
    fn validate(&self) -> CoreResult<()>;
}

impl Validate for Domain {
    fn validate(&self) -> CoreResult<()> {
        require_name(Self::LABEL, &self.id, &self.name)
    }
}

impl Validate for SoldDomain {
    fn validate(&self) -> CoreResult<()> {
        require_name(Self::LABEL, &self.id, &self.name)
    }
}

impl Validate for FriendlyLink {
    fn validate(&self) -> CoreResult<()> {
        require_name(Self::LABEL, &self.id, &self.name)?;
        if !self.has_web_url() {
            return Err(CoreError::ValidationError(format!(
                "friendly link {} has an invalid url: {}",
                self.id, self.url
            )));
        }
        Ok(())
    }
}

// Keyed by name, which `ensure_unique_keys` already requires.
impl Validate for Registrar {
    fn validate(&self) -> CoreResult<()> {
        Ok(())
    }
}

/// Assign missing ids and timestamps, reject duplicate keys, then check
/// every record.
pub(crate) fn prepare<R: Validate>(records: &[R], now: DateTime<Utc>) -> CoreResult<Vec<R>> {
    let stamped = stamp_records(records, now);
    ensure_unique_keys(&stamped)?;
    for record in &stamped {
        record.validate()?;
    }
    Ok(stamped)
}

fn require_name(label: &str, id: &str, name: &str) -> CoreResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::ValidationError(format!("{label} {id} has no name")));
    }
    Ok(())
}
