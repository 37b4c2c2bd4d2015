//! Expansion of divert schedules into concrete occurrences.
//!
//! A reporter submits either a single divert (a start and an optional end) or
//! a recurring daily window across a date range. Both are turned into a list
//! of [`Occurrence`]s, each partitioned by the civil day it starts on.

use chrono::{Days, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::civil::{CivilDate, CivilTimeOfDay, DayKey, Instant, Zone, resolve_wall, to_instant};
use crate::error::{DivertError, DivertResult};

/// One scheduled start/end interval of a divert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// When the divert starts.
    pub start: Instant,
    /// When the divert ends, `None` while it is ongoing.
    pub end: Option<Instant>,
    /// Partition named by the civil day `start` falls on.
    pub day_key: DayKey,
}

impl Occurrence {
    /// Returns `true` if the occurrence has no end yet.
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Returns the length of the occurrence, if it has ended.
    pub fn duration(&self) -> Option<TimeDelta> {
        self.end.map(|end| end - self.start)
    }

    /// Returns a copy of this occurrence ended at `at`.
    #[must_use]
    pub fn cleared_at(&self, at: Instant) -> Self {
        Self {
            end: Some(at),
            ..self.clone()
        }
    }
}

/// Returns `true` if a daily window ending at `daily_end` must end on the
/// civil day after it starts.
///
/// Equal start and end times count as overnight (a 24-hour window).
pub fn is_overnight(daily_start: CivilTimeOfDay, daily_end: CivilTimeOfDay) -> bool {
    daily_end <= daily_start
}

/// Expands a recurring daily window into one occurrence per start day.
///
/// For a same-day window there is one occurrence for every day from
/// `start_date` to `end_date` inclusive. For an overnight window each
/// occurrence ends on the next civil day, so the start days stop one day
/// before `end_date` and the last occurrence ends on `end_date`; a single-day
/// range still yields one occurrence ending the following day.
///
/// # Errors
///
/// Returns [`DivertError::InvalidRange`] if `end_date` is before `start_date`.
pub fn expand(
    start_date: CivilDate,
    end_date: CivilDate,
    daily_start: CivilTimeOfDay,
    daily_end: CivilTimeOfDay,
    zone: &Zone,
) -> DivertResult<Vec<Occurrence>> {
    if end_date < start_date {
        return Err(DivertError::date_range(
            start_date.as_naive(),
            end_date.as_naive(),
        ));
    }

    let overnight = is_overnight(daily_start, daily_end);
    let last_start_day = if overnight && start_date != end_date {
        end_date.days_before(1)?
    } else {
        end_date
    };

    let capacity = start_date.days_until(last_start_day) + 1;
    let mut occurrences = Vec::with_capacity(usize::try_from(capacity).unwrap_or_default());
    let mut day = start_date;
    loop {
        // The end day only resolves an instant and never names a partition,
        // so it may be 10000-01-01.
        let end_day = if overnight {
            day.as_naive()
                .checked_add_days(Days::new(1))
                .ok_or_else(|| DivertError::civil_field("date", day))?
        } else {
            day.as_naive()
        };
        occurrences.push(Occurrence {
            start: to_instant(day, daily_start, zone),
            end: Some(resolve_wall(end_day, daily_end, zone)),
            day_key: day.key(),
        });
        if day >= last_start_day {
            break;
        }
        day = day.next_day()?;
    }

    debug!(
        %start_date,
        %end_date,
        %daily_start,
        %daily_end,
        overnight,
        count = occurrences.len(),
        "expanded recurring window"
    );
    Ok(occurrences)
}

/// Builds the occurrence for a single (non-recurring) divert.
///
/// Without an end the occurrence is open-ended.
///
/// # Errors
///
/// Returns [`DivertError::InvalidRange`] if the end resolves before the start.
pub fn single(
    start_date: CivilDate,
    start_time: CivilTimeOfDay,
    end: Option<(CivilDate, CivilTimeOfDay)>,
    zone: &Zone,
) -> DivertResult<Occurrence> {
    let start = to_instant(start_date, start_time, zone);
    let end = match end {
        Some((end_date, end_time)) => {
            let end = to_instant(end_date, end_time, zone);
            if end < start {
                return Err(DivertError::InvalidRange {
                    start: format!("{start_date} {start_time}"),
                    end: format!("{end_date} {end_time}"),
                });
            }
            Some(end)
        }
        None => None,
    };

    debug!(%start_date, %start_time, open = end.is_none(), "built single occurrence");
    Ok(Occurrence {
        start,
        end,
        day_key: start_date.key(),
    })
}

/// A divert schedule as submitted by a reporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
    /// One divert. It ends only if both `end_date` and `end_time` are given.
    Single {
        start_date: CivilDate,
        start_time: CivilTimeOfDay,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end_date: Option<CivilDate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end_time: Option<CivilTimeOfDay>,
    },
    /// A daily window repeated across an inclusive date range.
    Recurring {
        start_date: CivilDate,
        end_date: CivilDate,
        daily_start: CivilTimeOfDay,
        daily_end: CivilTimeOfDay,
    },
}

impl Schedule {
    /// Expands the schedule into its occurrences, in start-day order.
    pub fn occurrences(&self, zone: &Zone) -> DivertResult<Vec<Occurrence>> {
        match *self {
            Self::Single {
                start_date,
                start_time,
                end_date,
                end_time,
            } => {
                let end = end_date.zip(end_time);
                Ok(vec![single(start_date, start_time, end, zone)?])
            }
            Self::Recurring {
                start_date,
                end_date,
                daily_start,
                daily_end,
            } => expand(start_date, end_date, daily_start, daily_end, zone),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::civil::format_civil;
    use chrono::{TimeZone, Utc};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> Instant {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> CivilDate {
        CivilDate::new(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> CivilTimeOfDay {
        CivilTimeOfDay::new(h, m).unwrap()
    }

    fn keys(occurrences: &[Occurrence]) -> Vec<&str> {
        occurrences.iter().map(|o| o.day_key.as_str()).collect()
    }

    mod expand {
        use super::*;

        #[test]
        fn single_day_without_dst() {
            let regina = Zone::regina();
            let occ = expand(
                date(2025, 3, 8),
                date(2025, 3, 8),
                time(1, 30),
                time(3, 30),
                &regina,
            )
            .unwrap();

            assert_eq!(occ.len(), 1);
            assert_eq!(occ[0].start, utc(2025, 3, 8, 7, 30));
            assert_eq!(occ[0].duration(), Some(TimeDelta::hours(2)));
            assert_eq!(occ[0].day_key, "2025-03-08");
        }

        #[test]
        fn same_day_window_each_day() {
            let regina = Zone::regina();
            let occ = expand(
                date(2025, 1, 1),
                date(2025, 1, 3),
                time(7, 0),
                time(19, 0),
                &regina,
            )
            .unwrap();

            assert_eq!(keys(&occ), ["2025-01-01", "2025-01-02", "2025-01-03"]);
            for o in &occ {
                assert_eq!(o.duration(), Some(TimeDelta::hours(12)));
                assert!(format_civil(o.start, &regina).starts_with(o.day_key.as_str()));
            }
            assert_eq!(occ[2].end, Some(utc(2025, 1, 4, 1, 0)));
        }

        #[test]
        fn overnight_window_ends_next_day() {
            let regina = Zone::regina();
            let occ = expand(
                date(2025, 1, 1),
                date(2025, 1, 3),
                time(22, 0),
                time(6, 0),
                &regina,
            )
            .unwrap();

            assert_eq!(keys(&occ), ["2025-01-01", "2025-01-02"]);
            assert_eq!(format_civil(occ[0].end.unwrap(), &regina), "2025-01-02 06:00");
            assert_eq!(format_civil(occ[1].end.unwrap(), &regina), "2025-01-03 06:00");
            for o in &occ {
                assert_eq!(o.duration(), Some(TimeDelta::hours(8)));
            }
        }

        #[test]
        fn overnight_single_day_spills_into_next_day() {
            let regina = Zone::regina();
            let occ = expand(
                date(2025, 1, 31),
                date(2025, 1, 31),
                time(22, 0),
                time(6, 0),
                &regina,
            )
            .unwrap();

            assert_eq!(occ.len(), 1);
            assert_eq!(occ[0].day_key, "2025-01-31");
            assert_eq!(format_civil(occ[0].end.unwrap(), &regina), "2025-02-01 06:00");
        }

        #[test]
        fn equal_times_are_overnight() {
            let regina = Zone::regina();
            assert!(is_overnight(time(8, 0), time(8, 0)));

            let occ = expand(
                date(2025, 1, 1),
                date(2025, 1, 3),
                time(8, 0),
                time(8, 0),
                &regina,
            )
            .unwrap();
            assert_eq!(keys(&occ), ["2025-01-01", "2025-01-02"]);
            assert_eq!(occ[0].duration(), Some(TimeDelta::hours(24)));
        }

        #[test]
        fn reversed_range_is_rejected() {
            let result = expand(
                date(2025, 1, 3),
                date(2025, 1, 1),
                time(7, 0),
                time(19, 0),
                &Zone::regina(),
            );
            assert!(matches!(result, Err(DivertError::InvalidRange { .. })));
        }

        #[test]
        fn occurrence_counts() {
            let regina = Zone::regina();
            let start = date(2024, 12, 28);
            for span in 0..10u32 {
                let end = date(2025, 1, 6).days_before(9 - span).unwrap();
                let days = start.days_until(end) as usize;

                let same_day = expand(start, end, time(9, 0), time(17, 0), &regina).unwrap();
                assert_eq!(same_day.len(), days + 1);
                assert!(same_day.iter().all(|o| o.end.unwrap() > o.start));

                let overnight = expand(start, end, time(20, 0), time(4, 0), &regina).unwrap();
                if days == 0 {
                    assert_eq!(overnight.len(), 1);
                } else {
                    assert_eq!(overnight.len(), days);
                    let last = overnight.last().unwrap().end.unwrap();
                    assert_eq!(format_civil(last, &regina), format!("{end} 04:00"));
                }
            }
        }

        #[test]
        fn overnight_across_spring_forward() {
            let ny = Zone::parse("America/New_York").unwrap();
            let occ = expand(
                date(2025, 3, 8),
                date(2025, 3, 10),
                time(22, 0),
                time(6, 0),
                &ny,
            )
            .unwrap();

            assert_eq!(keys(&occ), ["2025-03-08", "2025-03-09"]);
            // The night of the transition is an hour shorter.
            assert_eq!(occ[0].duration(), Some(TimeDelta::hours(7)));
            assert_eq!(occ[1].duration(), Some(TimeDelta::hours(8)));
            assert_eq!(format_civil(occ[0].end.unwrap(), &ny), "2025-03-09 06:00");
        }

        #[test]
        fn crosses_month_and_year() {
            let occ = expand(
                date(2024, 12, 30),
                date(2025, 1, 2),
                time(7, 0),
                time(8, 0),
                &Zone::regina(),
            )
            .unwrap();
            assert_eq!(
                keys(&occ),
                ["2024-12-30", "2024-12-31", "2025-01-01", "2025-01-02"]
            );
        }

        #[test]
        fn expansion_is_repeatable() {
            let regina = Zone::regina();
            let run = || {
                expand(date(2025, 5, 1), date(2025, 5, 7), time(23, 0), time(1, 0), &regina)
            };
            assert_eq!(run().unwrap(), run().unwrap());
        }

        #[test]
        fn overnight_on_last_supported_day() {
            let regina = Zone::regina();
            let occ = expand(
                date(9999, 12, 31),
                date(9999, 12, 31),
                time(22, 0),
                time(6, 0),
                &regina,
            )
            .unwrap();
            assert_eq!(occ.len(), 1);
            assert_eq!(occ[0].day_key, "9999-12-31");
            assert_eq!(occ[0].start, Utc.with_ymd_and_hms(10000, 1, 1, 4, 0, 0).unwrap());
            assert_eq!(occ[0].end, Some(Utc.with_ymd_and_hms(10000, 1, 1, 12, 0, 0).unwrap()));

            let occ = expand(
                date(9999, 12, 30),
                date(9999, 12, 31),
                time(22, 0),
                time(6, 0),
                &regina,
            )
            .unwrap();
            assert_eq!(keys(&occ), ["9999-12-30"]);
        }
    }

    mod single {
        use super::*;

        #[test]
        fn open_ended_without_end() {
            let occ = single(date(2025, 10, 5), time(7, 0), None, &Zone::regina()).unwrap();
            assert!(occ.is_open());
            assert_eq!(occ.end, None);
            assert_eq!(occ.duration(), None);
            assert_eq!(occ.start, utc(2025, 10, 5, 13, 0));
            assert_eq!(occ.day_key, "2025-10-05");
        }

        #[test]
        fn with_end_on_later_day() {
            let occ = single(
                date(2025, 10, 5),
                time(22, 0),
                Some((date(2025, 10, 7), time(6, 0))),
                &Zone::regina(),
            )
            .unwrap();
            assert_eq!(occ.day_key, "2025-10-05");
            assert_eq!(occ.duration(), Some(TimeDelta::hours(32)));
        }

        #[test]
        fn end_before_start_is_rejected() {
            let result = single(
                date(2025, 10, 5),
                time(7, 0),
                Some((date(2025, 10, 5), time(6, 59))),
                &Zone::regina(),
            );
            assert!(matches!(result, Err(DivertError::InvalidRange { .. })));
        }

        #[test]
        fn clearing_attaches_end() {
            let occ = single(date(2025, 10, 5), time(7, 0), None, &Zone::regina()).unwrap();
            let cleared = occ.cleared_at(utc(2025, 10, 5, 15, 0));
            assert!(!cleared.is_open());
            assert_eq!(cleared.duration(), Some(TimeDelta::hours(2)));
            assert_eq!(cleared.day_key, occ.day_key);
        }

        #[test]
        fn open_end_serializes_as_null() {
            let occ = single(date(2025, 10, 5), time(7, 0), None, &Zone::regina()).unwrap();
            let json = serde_json::to_value(&occ).unwrap();
            assert!(json.get("end").unwrap().is_null());
            assert_eq!(json["day_key"], "2025-10-05");
        }
    }

    mod schedule {
        use super::*;

        #[test]
        fn single_needs_both_end_fields() {
            let schedule = Schedule::Single {
                start_date: date(2025, 1, 1),
                start_time: time(7, 0),
                end_date: Some(date(2025, 1, 1)),
                end_time: None,
            };
            let occ = schedule.occurrences(&Zone::regina()).unwrap();
            assert_eq!(occ.len(), 1);
            assert!(occ[0].is_open());
        }

        #[test]
        fn recurring_dispatches_to_expand() {
            let schedule = Schedule::Recurring {
                start_date: date(2025, 1, 1),
                end_date: date(2025, 1, 3),
                daily_start: time(22, 0),
                daily_end: time(6, 0),
            };
            let occ = schedule.occurrences(&Zone::regina()).unwrap();
            assert_eq!(keys(&occ), ["2025-01-01", "2025-01-02"]);
        }

        #[test]
        fn deserializes_from_form_json() {
            let json = r#"{
                "type": "recurring",
                "start_date": "2025-01-01",
                "end_date": "2025-01-03",
                "daily_start": "07:00",
                "daily_end": "19:00"
            }"#;
            let schedule: Schedule = serde_json::from_str(json).unwrap();
            assert_eq!(schedule.occurrences(&Zone::regina()).unwrap().len(), 3);

            let bad = r#"{"type": "single", "start_date": "2025-01-01", "start_time": "25:00"}"#;
            assert!(serde_json::from_str::<Schedule>(bad).is_err());
        }
    }
}
