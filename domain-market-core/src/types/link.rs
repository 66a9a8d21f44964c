//! Friendly link type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A link shown in the "friends" section of the site
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FriendlyLink {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Target URL; must be `http` or `https`
    pub url: String,
    #[serde(default)]
    pub description: String,
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

impl FriendlyLink {
    /// Whether `url` parses as an absolute `http`/`https` URL.
    #[must_use]
    pub fn has_web_url(&self) -> bool {
        url::Url::parse(&self.url)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
            .unwrap_or(false)
    }
}
