//! Decoding of documents read back from the store.
//!
//! Timestamps come back in whichever encoding the store or an export tool
//! used. [`StoredInstant`] accepts all of them and [`DivertRecord`] is the
//! decoded form of one divert document, ready for window filtering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::civil::{DayKey, Instant};
use crate::divert::{DivertKind, DivertStatus};
use crate::error::{DivertError, DivertResult};
use crate::recurrence::Occurrence;

/// A timestamp as encoded in a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredInstant {
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    /// RFC 3339 text, e.g. `2025-10-05T13:00:00Z`.
    Text(String),
    /// A `{seconds, nanoseconds}` timestamp object.
    Timestamp {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
}

impl StoredInstant {
    /// Converts the stored encoding into an [`Instant`].
    pub fn to_instant(&self) -> DivertResult<Instant> {
        match self {
            Self::Millis(ms) => DateTime::from_timestamp_millis(*ms)
                .ok_or_else(|| DivertError::InvalidTimestamp(ms.to_string())),
            Self::Text(text) => DateTime::parse_from_rfc3339(text.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| DivertError::InvalidTimestamp(format!("{text}: {e}"))),
            Self::Timestamp {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(*seconds, *nanoseconds).ok_or_else(|| {
                DivertError::InvalidTimestamp(format!("{seconds}s {nanoseconds}ns"))
            }),
        }
    }
}

impl From<Instant> for StoredInstant {
    fn from(instant: Instant) -> Self {
        Self::Millis(instant.timestamp_millis())
    }
}

/// One divert document as read from a day partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawDivertRecord")]
pub struct DivertRecord {
    pub hospital_id: String,
    pub kind: DivertKind,
    pub status: DivertStatus,
    pub started_at: Instant,
    /// `None` while the divert is ongoing.
    pub cleared_at: Option<Instant>,
    #[serde(rename = "dateKey")]
    pub day_key: DayKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DivertRecord {
    /// Returns the scheduled interval of this record.
    pub fn occurrence(&self) -> Occurrence {
        Occurrence {
            start: self.started_at,
            end: self.cleared_at,
            day_key: self.day_key.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDivertRecord {
    hospital_id: String,
    kind: DivertKind,
    #[serde(default)]
    status: DivertStatus,
    started_at: StoredInstant,
    // A missing field and an explicit null both mean open-ended.
    #[serde(default)]
    cleared_at: Option<StoredInstant>,
    #[serde(rename = "dateKey")]
    day_key: DayKey,
    #[serde(default)]
    notes: Option<String>,
}

impl TryFrom<RawDivertRecord> for DivertRecord {
    type Error = DivertError;

    fn try_from(raw: RawDivertRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            hospital_id: raw.hospital_id,
            kind: raw.kind,
            status: raw.status,
            started_at: raw.started_at.to_instant()?,
            cleared_at: raw.cleared_at.as_ref().map(StoredInstant::to_instant).transpose()?,
            day_key: raw.day_key,
            notes: raw.notes.filter(|n| !n.trim().is_empty()),
        })
    }
}
