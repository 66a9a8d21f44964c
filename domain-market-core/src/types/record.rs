//! Shared behaviour of collection records

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::{Domain, FriendlyLink, Registrar, SoldDomain};
use crate::error::{CoreError, CoreResult};

/// A record stored in a full-replace collection.
pub trait Record: Clone + Send + Sync {
    /// Collection label used in messages
    const LABEL: &'static str;
    /// Whether a missing key may be generated (registrars are keyed by name)
    const GENERATED_KEY: bool;

    fn key(&self) -> &str;
    fn set_key(&mut self, key: String);
    fn stamps_mut(&mut self) -> (&mut Option<DateTime<Utc>>, &mut Option<DateTime<Utc>>);
}

macro_rules! impl_record {
    ($ty:ty, $label:literal, $key:ident, $generated:literal) => {
        impl Record for $ty {
            const LABEL: &'static str = $label;
            const GENERATED_KEY: bool = $generated;

            fn key(&self) -> &str {
                &self.$key
            }

            fn set_key(&mut self, key: String) {
                self.$key = key;
            }

            fn stamps_mut(
                &mut self,
            ) -> (&mut Option<DateTime<Utc>>, &mut Option<DateTime<Utc>>) {
                (&mut self.created_at, &mut self.updated_at)
            }
        }
    };
}

impl_record!(Domain, "domain", id, true);
impl_record!(SoldDomain, "sold domain", id, true);
impl_record!(FriendlyLink, "friendly link", id, true);
impl_record!(Registrar, "registrar", name, false);

/// Assign missing keys and timestamps.
///
/// `created_at` and `updated_at` are only filled where absent, so a
/// replace followed by a read returns the caller's own timestamps.
#[must_use]
pub fn stamp_records<R: Record>(records: &[R], now: DateTime<Utc>) -> Vec<R> {
    records
        .iter()
        .cloned()
        .map(|mut record| {
            if R::GENERATED_KEY && record.key().trim().is_empty() {
                record.set_key(uuid::Uuid::new_v4().to_string());
            }
            let (created_at, updated_at) = record.stamps_mut();
            created_at.get_or_insert(now);
            updated_at.get_or_insert(now);
            record
        })
        .collect()
}

/// Reject empty or duplicated keys.
pub fn ensure_unique_keys<R: Record>(records: &[R]) -> CoreResult<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        let key = record.key();
        if key.trim().is_empty() {
            return Err(CoreError::ValidationError(format!(
                "{} without identifier",
                R::LABEL
            )));
        }
        if !seen.insert(key) {
            return Err(CoreError::ValidationError(format!(
                "duplicate {} identifier: {key}",
                R::LABEL
            )));
        }
    }
    Ok(())
}
