//! Domain listing related type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a listed domain
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    /// Listed and shown on the marketplace
    #[default]
    Active,
    /// Open for offers
    Available,
    /// Sale completed
    Sold,
}

impl DomainStatus {
    /// Storage representation used by the SQL backend
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Available => "available",
            Self::Sold => "sold",
        }
    }

    /// Parse the storage representation. Unknown values fall back to `Active`.
    #[must_use]
    pub fn from_storage(value: &str) -> Self {
        match value {
            "available" => Self::Available,
            "sold" => Self::Sold,
            _ => Self::Active,
        }
    }
}

/// A domain listed on the marketplace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    /// Unique identifier within the domain collection
    #[serde(default)]
    pub id: String,
    /// Display name (without the extension)
    pub name: String,
    /// Extension / suffix, e.g. `.com`
    #[serde(default)]
    pub extension: String,
    #[serde(default)]
    pub status: DomainStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrar: Option<String>,
    /// Registrar icon reference (URL or settings key)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrar_icon: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::datetime::option"
    )]
    pub registered_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::datetime::option"
    )]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Featured domains are listed first
    #[serde(default)]
    pub featured: bool,
    /// Buyer name (sale metadata)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<String>,
    /// Sale date (sale metadata)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::datetime::option"
    )]
    pub sold_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::datetime::option"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::datetime::option"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Domain {
    /// Full domain name, e.g. `example` + `.com`
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.extension.is_empty() || self.name.ends_with(&self.extension) {
            self.name.clone()
        } else if self.extension.starts_with('.') {
            format!("{}{}", self.name, self.extension)
        } else {
            format!("{}.{}", self.name, self.extension)
        }
    }
}

/// Record of a completed sale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SoldDomain {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub extension: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::datetime::option"
    )]
    pub sold_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrar: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::datetime::option"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::datetime::option"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SoldDomain {
    /// Derive a sale record from a domain whose status is `sold`.
    ///
    /// The id is prefixed so a derived record never collides with a stored one.
    #[must_use]
    pub fn derived_from(domain: &Domain) -> Self {
        Self {
            id: format!("derived-{}", domain.id),
            name: domain.name.clone(),
            extension: domain.extension.clone(),
            price: domain.price.clone(),
            buyer: domain.buyer.clone(),
            sold_at: domain.sold_at,
            registrar: domain.registrar.clone(),
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}
