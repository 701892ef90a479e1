// Book record stored in the library

use crate::filter::Field;
use chrono::{DateTime, Local, LocalResult, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;

/// Timestamp layout used by library files written before `added_at` was RFC 3339
const LEGACY_ADDED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One catalogued book
///
/// Older library files used `publication_year`, `read_status` and `added_date`;
/// those keys are accepted on load and rewritten under the current names on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    #[serde(alias = "publication_year")]
    pub year: Year,
    pub genre: String,
    /// Opaque category, e.g. "Read"/"Unread" or "ToRead"/"Reading"/"Finished"
    #[serde(alias = "read_status")]
    pub status: String,
    #[serde(
        alias = "added_date",
        serialize_with = "serialize_added_at",
        deserialize_with = "deserialize_added_at"
    )]
    pub added_at: DateTime<Utc>,
}

impl Book {
    /// Value of `field` as text, the form used for searching and tallying
    pub fn value(&self, field: Field) -> Cow<'_, str> {
        match field {
            Field::Title => Cow::Borrowed(&self.title),
            Field::Author => Cow::Borrowed(&self.author),
            Field::Year => match &self.year {
                Year::Text(s) => Cow::Borrowed(s),
                Year::Int(y) => Cow::Owned(y.to_string()),
            },
            Field::Genre => Cow::Borrowed(&self.genre),
            Field::Status => Cow::Borrowed(&self.status),
        }
    }
}

/// Publication year, kept in whatever shape it was supplied
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Year {
    Int(i64),
    Text(String),
}

impl Year {
    /// Integer value of the year, if it has one
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Year::Int(y) => Some(*y),
            Year::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Year::Text(s) if s.trim().is_empty())
    }
}

impl std::fmt::Display for Year {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Year::Int(y) => write!(f, "{}", y),
            Year::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Year {
    fn from(value: i64) -> Self {
        Year::Int(value)
    }
}

impl From<&str> for Year {
    fn from(value: &str) -> Self {
        Year::Text(value.to_string())
    }
}

impl From<String> for Year {
    fn from(value: String) -> Self {
        Year::Text(value)
    }
}

/// Render `added_at` the way every persisted format stores it
pub fn format_added_at(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse a persisted `added_at`, accepting RFC 3339 or the legacy local-time layout
pub fn parse_added_at(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(value, LEGACY_ADDED_FORMAT).ok()?;
    Some(resolve_legacy(Local.from_local_datetime(&naive), &naive))
}

/// Pick the earliest reading of a legacy local time; a time skipped by a
/// DST change has none, so it is taken as UTC
fn resolve_legacy<Tz: TimeZone>(local: LocalResult<DateTime<Tz>>, naive: &NaiveDateTime) -> DateTime<Utc> {
    match local.earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        None => naive.and_utc(),
    }
}

fn serialize_added_at<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_added_at(value))
}

fn deserialize_added_at<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_added_at(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid added_at timestamp: {}", raw)))
}
