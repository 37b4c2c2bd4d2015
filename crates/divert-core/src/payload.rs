//! Store write documents for divert submissions.
//!
//! The store rejects "undefined" markers, so optional report metadata that
//! is absent is left out of the serialized document entirely. An open-ended
//! divert is the one exception: it is written with an explicit
//! `"clearedAt": null` so that queries for ongoing diverts can match it.

use serde::Serialize;

use crate::civil::{DayKey, Instant, Zone};
use crate::divert::{DivertKind, DivertSource, DivertStatus, ReporterTier};
use crate::error::DivertResult;
use crate::recurrence::{Occurrence, Schedule};

/// Caller-supplied metadata attached to every occurrence of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMeta {
    pub hospital_id: String,
    pub kind: DivertKind,
    pub notes: Option<String>,
    pub source: DivertSource,
    pub created_by_uid: Option<String>,
    pub unit_report_key: Option<String>,
    pub reporter_tier: ReporterTier,
}

impl ReportMeta {
    /// Metadata for a report filed by a person.
    ///
    /// The tier is `User` when a uid is given and `Anonymous` otherwise.
    pub fn user(hospital_id: impl Into<String>, kind: DivertKind, uid: Option<String>) -> Self {
        let reporter_tier = if uid.is_some() {
            ReporterTier::User
        } else {
            ReporterTier::Anonymous
        };
        Self {
            hospital_id: hospital_id.into(),
            kind,
            notes: None,
            source: DivertSource::User,
            created_by_uid: uid,
            unit_report_key: None,
            reporter_tier,
        }
    }

    /// Metadata for a report filed by a registered unit.
    pub fn unit(
        hospital_id: impl Into<String>,
        kind: DivertKind,
        unit_id: impl Into<String>,
        report_key: impl Into<String>,
    ) -> Self {
        Self {
            hospital_id: hospital_id.into(),
            kind,
            notes: None,
            source: DivertSource::Unit {
                unit_id: unit_id.into(),
            },
            created_by_uid: None,
            unit_report_key: Some(report_key.into()),
            reporter_tier: ReporterTier::Anonymous,
        }
    }

    /// Builder: set notes. Blank notes are treated as absent.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        self.notes = (!notes.trim().is_empty()).then_some(notes);
        self
    }

    /// Builder: set the reporter tier.
    #[must_use]
    pub fn with_tier(mut self, tier: ReporterTier) -> Self {
        self.reporter_tier = tier;
        self
    }
}

/// The document written to a day partition for one occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DivertPayload {
    pub hospital_id: String,
    pub kind: DivertKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: DivertStatus,
    pub started_at: Instant,
    pub cleared_at: Option<Instant>,
    #[serde(rename = "dateKey")]
    pub day_key: DayKey,
    pub source: DivertSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_report_key: Option<String>,
    pub reporter_tier: ReporterTier,
    pub verify_count: u32,
    pub reports_count: u32,
}

impl DivertPayload {
    /// Builds the write document for `occurrence`.
    pub fn from_occurrence(occurrence: &Occurrence, meta: &ReportMeta) -> Self {
        Self {
            hospital_id: meta.hospital_id.clone(),
            kind: meta.kind,
            notes: meta.notes.clone().filter(|n| !n.trim().is_empty()),
            status: DivertStatus::Active,
            started_at: occurrence.start,
            cleared_at: occurrence.end,
            day_key: occurrence.day_key.clone(),
            source: meta.source.clone(),
            created_by_uid: meta.created_by_uid.clone().filter(|u| !u.is_empty()),
            unit_report_key: meta.unit_report_key.clone().filter(|k| !k.is_empty()),
            reporter_tier: meta.reporter_tier,
            verify_count: 0,
            reports_count: 1,
        }
    }

    /// Serializes the payload into a JSON document.
    pub fn to_document(&self) -> DivertResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Expands `schedule` and builds one write document per occurrence.
pub fn build_payloads(
    schedule: &Schedule,
    meta: &ReportMeta,
    zone: &Zone,
) -> DivertResult<Vec<DivertPayload>> {
    let occurrences = schedule.occurrences(zone)?;
    Ok(occurrences
        .iter()
        .map(|occurrence| DivertPayload::from_occurrence(occurrence, meta))
        .collect())
}

/// The update document for clearing a divert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearUpdate {
    pub status: DivertStatus,
    pub cleared_at: Instant,
}

impl ClearUpdate {
    /// Marks a divert cleared at `at`.
    pub fn now(at: Instant) -> Self {
        Self {
            status: DivertStatus::Cleared,
            cleared_at: at,
        }
    }
}
