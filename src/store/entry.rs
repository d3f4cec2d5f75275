//! History entry model.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Which transform produced an entry.
///
/// Written lowercase; read case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Encrypt,
    Decrypt,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Encrypt => f.pad("encrypt"),
            Operation::Decrypt => f.pad("decrypt"),
        }
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "encrypt" => Ok(Operation::Encrypt),
            "decrypt" => Ok(Operation::Decrypt),
            other => Err(format!("unknown operation '{}'", other)),
        }
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.trim().parse().map_err(serde::de::Error::custom)
    }
}

/// Reads an RFC 3339 timestamp, or one without an offset as local time.
pub(crate) fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Local>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    if let Ok(stamped) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(stamped.with_timezone(&Local));
    }

    let naive = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))?;
    // Times skipped by a DST jump have no local reading.
    Ok(Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive)))
}

/// One recorded transform.
///
/// `id` and `timestamp` are fixed at creation. Only `note` and `is_favorite` are
/// meant to change afterwards. The history copy and the bookmark copy of a favorite
/// are separate values that share an `id`.
///
/// Serialized with PascalCase keys (`Id`, `Timestamp`, `Operation`, `Input`,
/// `Output`, `Note`, `IsFavorite`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HistoryEntry {
    pub id: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Local>,
    pub operation: Operation,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub is_favorite: bool,
}

impl HistoryEntry {
    /// Creates an entry with a fresh id, stamped now.
    pub fn new(operation: Operation, input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Local::now(),
            operation,
            input: input.into(),
            output: output.into(),
            note: String::new(),
            is_favorite: false,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }

    /// The copy stored in the bookmarks collection: same fields, always favorited.
    pub fn bookmark_copy(&self) -> Self {
        Self {
            is_favorite: true,
            ..self.clone()
        }
    }

    /// Case-insensitive substring match on input, output or note.
    ///
    /// `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.input.to_lowercase().contains(needle)
            || self.output.to_lowercase().contains(needle)
            || self.note.to_lowercase().contains(needle)
    }
}
