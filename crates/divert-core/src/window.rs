//! Query windows and partition planning.
//!
//! Occurrences are stored in per-civil-day partitions keyed by the day they
//! start on. This module provides [`Window`] for query ranges,
//! [`partitions_to_scan`] to decide which partitions may hold an occurrence
//! overlapping a window, and [`select_active`] to filter the fetched records.

use std::collections::BTreeSet;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::civil::{DayKey, Instant, Zone, saturating_day};
use crate::stored::DivertRecord;

/// Number of days before the window start scanned for still-open diverts.
pub const DEFAULT_BACKFILL_DAYS: u32 = 7;

/// A time window for querying diverts.
///
/// Represents a closed interval `[start, end]` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// Start of the window (inclusive).
    pub start: Instant,
    /// End of the window (inclusive).
    pub end: Instant,
}

impl Window {
    /// Creates a new window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: Instant, end: Instant) -> Self {
        assert!(start <= end, "Window start must be <= end");
        Self { start, end }
    }

    /// Creates a window from a start time and duration.
    pub fn from_duration(start: Instant, duration: Duration) -> Self {
        Self::new(start, start + duration)
    }

    /// Creates the landing-page window: `now` through the next `hours` hours.
    pub fn next_hours(now: Instant, hours: u32) -> Self {
        Self::from_duration(now, Duration::hours(i64::from(hours)))
    }

    /// Returns the duration of this window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if an interval starting at `start` and ending at `end` (`None`
    /// for still open) overlaps this window.
    ///
    /// The interval is `[start, end)`; an open interval extends forever.
    pub fn overlaps(&self, start: Instant, end: Option<Instant>) -> bool {
        start <= self.end && end.is_none_or(|end| end > self.start)
    }
}

/// Returns every partition that may hold an occurrence overlapping `window`.
///
/// The result covers the civil days from `backfill_days` days before the day
/// containing `window.start` through the day containing `window.end`, both in
/// `zone`. The window is not normalized: if `start` is after `end` only the
/// days the inclusive range still spans are returned. Days past `9999-12-31`
/// or before `0001-01-01` never hold a partition and are pinned to those
/// bounds.
pub fn partitions_to_scan(window: &Window, zone: &Zone, backfill_days: u32) -> BTreeSet<DayKey> {
    let start_day = saturating_day(window.start, zone);
    let end_day = saturating_day(window.end, zone);

    // Clamp at the first representable day rather than skip the scan.
    let first = (0..=backfill_days)
        .rev()
        .find_map(|days| start_day.days_before(days).ok())
        .unwrap_or(start_day);

    let mut partitions = BTreeSet::new();
    let mut day = first;
    while day <= end_day {
        partitions.insert(day.key());
        match day.next_day() {
            Ok(next) => day = next,
            Err(_) => break,
        }
    }

    debug!(
        %start_day,
        %end_day,
        backfill_days,
        count = partitions.len(),
        "planned partitions to scan"
    );
    partitions
}

/// Keeps the active records that overlap `window`, ordered by start then
/// hospital.
pub fn select_active<I>(window: &Window, records: I) -> Vec<DivertRecord>
where
    I: IntoIterator<Item = DivertRecord>,
{
    let mut selected: Vec<DivertRecord> = records
        .into_iter()
        .filter(|r| r.status.is_active() && window.overlaps(r.started_at, r.cleared_at))
        .collect();
    selected.sort_by(|a, b| {
        a.started_at
            .cmp(&b.started_at)
            .then_with(|| a.hospital_id.cmp(&b.hospital_id))
    });
    selected
}
