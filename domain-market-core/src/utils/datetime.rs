//! Datetime helpers.
//!
//! Serde support for `DateTime<Utc>` fields (written as RFC3339, read from
//! RFC3339 or Unix seconds/milliseconds), plus the string forms used in
//! SQL columns and file names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

use crate::error::{CoreError, CoreResult};

/// Serializes `DateTime<Utc>` as an RFC3339 string.
pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339())
}

/// Deserializes `DateTime<Utc>` from RFC3339 or a Unix timestamp.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Timestamp::deserialize(deserializer)? {
        Timestamp::String(s) => parse_rfc3339(&s).map_err(Error::custom),
        Timestamp::Number(ts) => {
            parse_unix_timestamp(ts).ok_or_else(|| Error::custom("Invalid Unix timestamp"))
        }
    }
}

/// Accepted wire forms of a timestamp.
#[derive(Deserialize)]
#[serde(untagged)]
enum Timestamp {
    String(String),
    Number(i64),
}

/// `Option<DateTime<Utc>>` serializer/deserializer helpers.
pub mod option {
    use super::{parse_rfc3339, parse_unix_timestamp, DateTime, Deserialize, Deserializer, Serializer, Timestamp, Utc};

    /// Serializes `Option<DateTime<Utc>>` as RFC3339 or `null`.
    #[allow(clippy::ref_option)]
    pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match dt {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes `Option<DateTime<Utc>>` from RFC3339, Unix timestamp, `null`
    /// or an empty string.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        match Option::<Timestamp>::deserialize(deserializer)? {
            Some(Timestamp::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Timestamp::String(s)) => parse_rfc3339(&s).map(Some).map_err(Error::custom),
            Some(Timestamp::Number(ts)) => parse_unix_timestamp(ts)
                .map(Some)
                .ok_or_else(|| Error::custom("Invalid Unix timestamp")),
            None => Ok(None),
        }
    }
}

/// Parses an RFC3339 string. Plain dates (`2024-05-01`) are read as midnight UTC.
pub fn parse_rfc3339(s: &str) -> CoreResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| CoreError::SerializationError(format!("Invalid RFC3339 timestamp: {s}")))
}

/// Parses an optional column value.
pub fn parse_optional(s: Option<&str>) -> CoreResult<Option<DateTime<Utc>>> {
    s.filter(|v| !v.is_empty()).map(parse_rfc3339).transpose()
}

/// Parses a Unix timestamp with second/millisecond auto-detection.
fn parse_unix_timestamp(ts: i64) -> Option<DateTime<Utc>> {
    // Values larger than 10^11 are interpreted as milliseconds.
    if ts > 100_000_000_000 {
        DateTime::from_timestamp_millis(ts)
    } else {
        DateTime::from_timestamp(ts, 0)
    }
}

/// Timestamp suffix for raw database file names, e.g. `20240501-093000-123`.
#[must_use]
pub fn file_stamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%d-%H%M%S-%3f").to_string()
}

/// Date-time suffix for snapshot document names, e.g. `2024-05-01-093000`.
#[must_use]
pub fn snapshot_stamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d-%H%M%S").to_string()
}
