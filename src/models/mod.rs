//! Data models for the magazine front end.
//!
//! These mirror the external API's JSON payloads and are decoded at the boundary.

mod comment;
mod contributor;
mod envelope;
mod issue;
mod page;
mod review;
mod subscription;

pub use comment::*;
pub use contributor::*;
pub use envelope::*;
pub use issue::*;
pub use page::*;
pub use review::*;
pub use subscription::*;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

/// Accept an identifier sent either as a JSON string or a number.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected a string or number identifier, got {}",
            other
        ))),
    }
}

/// Like [`string_or_number`], for fields that may be missing; empty and null become `None`.
pub(crate) fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Parse an RFC 3339 timestamp, treating anything unparseable as absent.
pub(crate) fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    })
}
