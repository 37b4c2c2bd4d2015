//! Civil (wall-clock) time in a fixed IANA zone.
//!
//! This module provides the value types a reporter types into a form
//! ([`CivilDate`], [`CivilTimeOfDay`]), the validated [`Zone`] they are
//! expressed in, and the conversions between civil time and UTC
//! [`Instant`]s:
//! - [`to_instant`]: wall clock in a zone → UTC instant
//! - [`format_civil`]: UTC instant → wall-clock text in a zone
//! - [`day_key_of`]: UTC instant → the civil day partition it falls on

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{DivertError, DivertResult};

/// An absolute point on the UTC timeline.
pub type Instant = DateTime<Utc>;

/// Zone used when a deployment does not configure one.
pub const DEFAULT_ZONE_ID: &str = "America/Regina";

/// A calendar date with no time-of-day or zone component.
///
/// Years are limited to `1..=9999` so that every date has a four-digit
/// `YYYY-MM-DD` day key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CivilDate(NaiveDate);

impl CivilDate {
    /// Creates a date, validating each component.
    pub fn new(year: i32, month: u32, day: u32) -> DivertResult<Self> {
        if !(1..=9999).contains(&year) {
            return Err(DivertError::civil_field("year", year));
        }
        if !(1..=12).contains(&month) {
            return Err(DivertError::civil_field("month", month));
        }
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| DivertError::civil_field("day", day))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Returns the underlying chrono date.
    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// Returns the following civil day.
    pub fn next_day(&self) -> DivertResult<Self> {
        self.0
            .checked_add_days(Days::new(1))
            .filter(|d| d.year() <= 9999)
            .map(Self)
            .ok_or_else(|| DivertError::civil_field("date", self))
    }

    /// Returns the civil day `days` days earlier.
    pub fn days_before(&self, days: u32) -> DivertResult<Self> {
        self.0
            .checked_sub_days(Days::new(u64::from(days)))
            .filter(|d| d.year() >= 1)
            .map(Self)
            .ok_or_else(|| DivertError::civil_field("date", self))
    }

    /// Number of days from `self` to `other` (negative if `other` is earlier).
    pub fn days_until(&self, other: CivilDate) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Returns the partition key for this day.
    pub fn key(&self) -> DayKey {
        DayKey(self.to_string())
    }
}

impl fmt::Display for CivilDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for CivilDate {
    type Err = DivertError;

    /// Parses `YYYY-MM-DD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('-');
        let (Some(y), Some(m), Some(d), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(DivertError::civil_field("date", s));
        };
        let year = parse_component(y, 4, "year")?;
        let month = parse_component(m, 2, "month")?;
        let day = parse_component(d, 2, "day")?;
        Self::new(year as i32, month, day)
    }
}

impl TryFrom<String> for CivilDate {
    type Error = DivertError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CivilDate> for String {
    fn from(date: CivilDate) -> Self {
        date.to_string()
    }
}

impl TryFrom<NaiveDate> for CivilDate {
    type Error = DivertError;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        if !(1..=9999).contains(&date.year()) {
            return Err(DivertError::civil_field("year", date.year()));
        }
        Ok(Self(date))
    }
}

/// A wall-clock time of day with minute precision.
///
/// Ordering is lexical on `(hour, minute)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CivilTimeOfDay {
    hour: u32,
    minute: u32,
}

impl CivilTimeOfDay {
    /// Midnight, `00:00`.
    pub const MIDNIGHT: Self = Self { hour: 0, minute: 0 };

    /// Creates a time of day, validating both components.
    pub fn new(hour: u32, minute: u32) -> DivertResult<Self> {
        if hour > 23 {
            return Err(DivertError::civil_field("hour", hour));
        }
        if minute > 59 {
            return Err(DivertError::civil_field("minute", minute));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Returns the equivalent chrono time (seconds are zero).
    pub fn as_naive(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for CivilTimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for CivilTimeOfDay {
    type Err = DivertError;

    /// Parses `HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((h, m)) = s.trim().split_once(':') else {
            return Err(DivertError::civil_field("time", s));
        };
        let hour = parse_component(h, 2, "hour")?;
        let minute = parse_component(m, 2, "minute")?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for CivilTimeOfDay {
    type Error = DivertError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CivilTimeOfDay> for String {
    fn from(time: CivilTimeOfDay) -> Self {
        time.to_string()
    }
}

fn parse_component(text: &str, max_len: usize, field: &'static str) -> DivertResult<u32> {
    if text.is_empty() || text.len() > max_len || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DivertError::civil_field(field, text));
    }
    text.parse().map_err(|_| DivertError::civil_field(field, text))
}

/// A validated IANA timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone(Tz);

impl Zone {
    /// Resolves an IANA zone identifier such as `America/Regina`.
    pub fn parse(id: &str) -> DivertResult<Self> {
        id.trim()
            .parse::<Tz>()
            .map(Self)
            .map_err(|_| DivertError::InvalidZone(id.to_string()))
    }

    /// The deployment default, `America/Regina` (no daylight saving).
    pub fn regina() -> Self {
        Self(chrono_tz::America::Regina)
    }

    /// Returns the IANA identifier.
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Returns the chrono-tz zone.
    pub fn tz(&self) -> Tz {
        self.0
    }
}

impl Default for Zone {
    fn default() -> Self {
        Self::regina()
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Zone {
    type Err = DivertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Tz> for Zone {
    fn from(tz: Tz) -> Self {
        Self(tz)
    }
}

/// The `YYYY-MM-DD` name of a civil-day partition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayKey(String);

impl DayKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DayKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for DayKey {
    type Err = DivertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<CivilDate>()?.key())
    }
}

impl TryFrom<String> for DayKey {
    type Error = DivertError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DayKey> for String {
    fn from(key: DayKey) -> Self {
        key.0
    }
}

impl PartialEq<&str> for DayKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Layout of civil text produced by [`format_civil_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CivilStyle {
    /// `2025-01-02 07:00`
    #[default]
    Iso,
    /// `Jan 2, 2025, 07:00`
    Medium,
}

/// Time format for civil text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// 24-hour format (e.g., "14:30").
    #[default]
    H24,
    /// 12-hour format with AM/PM (e.g., "2:30 PM").
    H12,
}

fn offset_at(tz: Tz, utc: NaiveDateTime) -> TimeDelta {
    let seconds = tz.offset_from_utc_datetime(&utc).fix().local_minus_utc();
    TimeDelta::seconds(i64::from(seconds))
}

fn reads_as(tz: Tz, utc: NaiveDateTime, wall: NaiveDateTime) -> bool {
    utc + offset_at(tz, utc) == wall
}

/// Resolves the instant at which the wall clock in `zone` reads `date` `time`.
///
/// The civil fields are first read as if they were UTC, the zone's offset at
/// that provisional instant is subtracted, and the offset is re-queried at the
/// candidate; a differing offset (near a transition) is applied instead.
///
/// Wall times that do not exist (inside a spring-forward gap) resolve to the
/// instant obtained with the pre-transition offset, i.e. the wall time shifted
/// forward by the length of the gap (`02:30` in a `02:00→03:00` gap becomes
/// `03:30`). Wall times that occur twice (a fall-back fold) resolve to the
/// earlier instant.
pub fn to_instant(date: CivilDate, time: CivilTimeOfDay, zone: &Zone) -> Instant {
    resolve_wall(date.as_naive(), time, zone)
}

/// Resolves a wall time on a chrono date that may lie past the supported
/// year range, such as the day after `9999-12-31` that ends an overnight
/// window.
pub(crate) fn resolve_wall(date: NaiveDate, time: CivilTimeOfDay, zone: &Zone) -> Instant {
    let tz = zone.tz();
    let wall = date.and_time(time.as_naive());

    let first = offset_at(tz, wall);
    let candidate = wall - first;
    let refined = offset_at(tz, candidate);

    let mut offsets = vec![first];
    if refined != first {
        offsets.push(refined);
    }
    // The offset in effect a day earlier exposes the other side of a fold
    // when the refined candidate landed on the later reading.
    let previous = offset_at(tz, candidate - TimeDelta::days(1));
    if !offsets.contains(&previous) {
        offsets.push(previous);
    }

    let candidates = offsets.iter().map(|offset| wall - *offset);
    let resolved = match candidates.clone().filter(|at| reads_as(tz, *at, wall)).min() {
        Some(at) => at,
        None => {
            let at = candidates.max().unwrap_or(candidate);
            trace!(zone = %zone, %date, %time, "wall time falls in a gap, shifted forward");
            at
        }
    };

    let instant = resolved.and_utc();
    trace!(zone = %zone, %date, %time, %instant, "resolved civil time");
    instant
}

/// Parses raw `YYYY-MM-DD`, `HH:MM` and zone strings and resolves the instant.
pub fn resolve_local(date: &str, time: &str, zone_id: &str) -> DivertResult<Instant> {
    let zone = Zone::parse(zone_id)?;
    let date: CivilDate = date.parse()?;
    let time: CivilTimeOfDay = time.parse()?;
    Ok(to_instant(date, time, &zone))
}

/// Parses `YYYY-MM-DD HH:MM` (or with a `T` separator) into civil fields.
pub fn parse_civil_datetime(text: &str) -> DivertResult<(CivilDate, CivilTimeOfDay)> {
    let text = text.trim();
    let Some((date, time)) = text.split_once([' ', 'T']) else {
        return Err(DivertError::civil_field("datetime", text));
    };
    Ok((date.parse()?, time.parse()?))
}

/// Returns the civil date and time of day of `instant` in `zone`.
///
/// Seconds are truncated.
///
/// # Errors
///
/// Returns [`DivertError::InvalidCivilField`] for `year` if the local date
/// falls outside years 1 through 9999.
pub fn civil_parts(instant: Instant, zone: &Zone) -> DivertResult<(CivilDate, CivilTimeOfDay)> {
    let local = instant.with_timezone(&zone.tz());
    let time = CivilTimeOfDay {
        hour: local.hour(),
        minute: local.minute(),
    };
    Ok((CivilDate::try_from(local.date_naive())?, time))
}

/// Returns the partition key of the civil day `instant` falls on in `zone`.
pub fn day_key_of(instant: Instant, zone: &Zone) -> DivertResult<DayKey> {
    Ok(civil_parts(instant, zone)?.0.key())
}

/// Returns today's partition key given the caller's notion of `now`.
pub fn today_key(now: Instant, zone: &Zone) -> DivertResult<DayKey> {
    day_key_of(now, zone)
}

/// Returns the civil day of `instant` in `zone`, pinned to the first or last
/// supported day when it falls outside years 1 through 9999.
pub(crate) fn saturating_day(instant: Instant, zone: &Zone) -> CivilDate {
    let date = instant.with_timezone(&zone.tz()).date_naive();
    let pinned = match date.year() {
        ..=0 => NaiveDate::from_ymd_opt(1, 1, 1),
        10000.. => NaiveDate::from_ymd_opt(9999, 12, 31),
        _ => Some(date),
    };
    CivilDate(pinned.unwrap_or(date))
}

/// Formats `instant` as `YYYY-MM-DD HH:MM` wall-clock text in `zone`.
pub fn format_civil(instant: Instant, zone: &Zone) -> String {
    format_civil_with(instant, zone, CivilStyle::Iso, TimeFormat::H24)
}

/// Formats `instant` as wall-clock text in `zone` using the given layout.
pub fn format_civil_with(
    instant: Instant,
    zone: &Zone,
    style: CivilStyle,
    time_format: TimeFormat,
) -> String {
    let pattern = match (style, time_format) {
        (CivilStyle::Iso, TimeFormat::H24) => "%Y-%m-%d %H:%M",
        (CivilStyle::Iso, TimeFormat::H12) => "%Y-%m-%d %-I:%M %p",
        (CivilStyle::Medium, TimeFormat::H24) => "%b %-d, %Y, %H:%M",
        (CivilStyle::Medium, TimeFormat::H12) => "%b %-d, %Y, %-I:%M %p",
    };
    instant.with_timezone(&zone.tz()).format(pattern).to_string()
}
