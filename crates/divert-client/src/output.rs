//! Rendering of command results as text or JSON.

use std::collections::BTreeSet;
use std::io::Write;

use divert_core::{
    CivilStyle, DayKey, DivertPayload, Instant, Occurrence, TimeFormat, Window, Zone,
    day_key_of, format_civil_with,
};
use serde_json::json;

use crate::config::DisplaySettings;
use crate::error::ClientResult;

/// Writes command results in the selected format.
#[derive(Debug, Clone)]
pub struct Renderer {
    zone: Zone,
    style: CivilStyle,
    time_format: TimeFormat,
    json: bool,
}

impl Renderer {
    /// Creates a renderer for civil text in `zone`.
    pub fn new(zone: Zone, display: &DisplaySettings, json: bool) -> Self {
        Self {
            zone,
            style: display.style,
            time_format: display.time_format,
            json,
        }
    }

    fn civil(&self, instant: Instant) -> String {
        format_civil_with(instant, &self.zone, self.style, self.time_format)
    }

    /// Writes one line per occurrence, or a JSON array.
    pub fn occurrences(
        &self,
        out: &mut impl Write,
        occurrences: &[Occurrence],
    ) -> ClientResult<()> {
        if self.json {
            writeln!(out, "{}", serde_json::to_string_pretty(occurrences)?)?;
            return Ok(());
        }
        for occurrence in occurrences {
            let end = occurrence
                .end
                .map_or_else(|| "(open)".to_string(), |end| self.civil(end));
            writeln!(
                out,
                "{}  {} -> {}",
                occurrence.day_key,
                self.civil(occurrence.start),
                end
            )?;
        }
        Ok(())
    }

    /// Writes store payloads, grouped by partition in text mode.
    pub fn payloads(&self, out: &mut impl Write, payloads: &[DivertPayload]) -> ClientResult<()> {
        if self.json {
            writeln!(out, "{}", serde_json::to_string_pretty(payloads)?)?;
            return Ok(());
        }
        for payload in payloads {
            writeln!(out, "{}: {}", payload.day_key, serde_json::to_string(payload)?)?;
        }
        Ok(())
    }

    /// Writes the partitions planned for `window`.
    pub fn partitions(
        &self,
        out: &mut impl Write,
        window: &Window,
        keys: &BTreeSet<DayKey>,
    ) -> ClientResult<()> {
        if self.json {
            let doc = json!({
                "start": window.start,
                "end": window.end,
                "zone": self.zone.name(),
                "partitions": keys,
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
            return Ok(());
        }
        for key in keys {
            writeln!(out, "{key}")?;
        }
        Ok(())
    }

    /// Writes `instant` as civil text along with its partition key.
    pub fn instant(&self, out: &mut impl Write, instant: Instant) -> ClientResult<()> {
        let civil = self.civil(instant);
        let day_key = day_key_of(instant, &self.zone)?;
        if self.json {
            let doc = json!({
                "instant": instant,
                "zone": self.zone.name(),
                "civil": civil,
                "dateKey": day_key,
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
        } else {
            writeln!(out, "{civil} ({}, partition {day_key})", self.zone)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use divert_core::{
        CivilDate, CivilTimeOfDay, DivertKind, ReportMeta, Schedule, build_payloads, expand,
    };

    fn render(json: bool, f: impl FnOnce(&Renderer, &mut Vec<u8>) -> ClientResult<()>) -> String {
        let renderer = Renderer::new(Zone::regina(), &DisplaySettings::default(), json);
        let mut out = Vec::new();
        f(&renderer, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn overnight() -> Vec<Occurrence> {
        expand(
            CivilDate::new(2025, 1, 1).unwrap(),
            CivilDate::new(2025, 1, 3).unwrap(),
            CivilTimeOfDay::new(22, 0).unwrap(),
            CivilTimeOfDay::new(6, 0).unwrap(),
            &Zone::regina(),
        )
        .unwrap()
    }

    #[test]
    fn occurrences_as_text() {
        let text = render(false, |r, out| r.occurrences(out, &overnight()));
        assert_eq!(
            text,
            "2025-01-01  2025-01-01 22:00 -> 2025-01-02 06:00\n\
             2025-01-02  2025-01-02 22:00 -> 2025-01-03 06:00\n"
        );
    }

    #[test]
    fn open_occurrence_as_text() {
        let start = Utc.with_ymd_and_hms(2025, 10, 5, 13, 0, 0).unwrap();
        let occurrence = Occurrence {
            start,
            end: None,
            day_key: "2025-10-05".parse().unwrap(),
        };
        let text = render(false, |r, out| r.occurrences(out, &[occurrence]));
        assert_eq!(text, "2025-10-05  2025-10-05 07:00 -> (open)\n");
    }

    #[test]
    fn occurrences_as_json() {
        let text = render(true, |r, out| r.occurrences(out, &overnight()));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["start"], "2025-01-02T04:00:00Z");
        assert_eq!(value[1]["end"], "2025-01-03T12:00:00Z");
        assert_eq!(value[1]["day_key"], "2025-01-02");
    }

    #[test]
    fn payloads_as_text() {
        let schedule = Schedule::Single {
            start_date: CivilDate::new(2025, 10, 5).unwrap(),
            start_time: CivilTimeOfDay::new(7, 0).unwrap(),
            end_date: None,
            end_time: None,
        };
        let meta = ReportMeta::user("rgh", DivertKind::Full, None);
        let payloads = build_payloads(&schedule, &meta, &Zone::regina()).unwrap();
        let text = render(false, |r, out| r.payloads(out, &payloads));
        assert!(text.starts_with("2025-10-05: {\"hospitalId\":\"rgh\""));
        assert!(text.contains("\"clearedAt\":null"));
    }

    #[test]
    fn partitions_as_json() {
        let window = Window::new(
            Utc.with_ymd_and_hms(2025, 10, 5, 13, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 10, 5, 15, 0, 0).unwrap(),
        );
        let keys: BTreeSet<DayKey> = ["2025-10-04", "2025-10-05"]
            .iter()
            .map(|k| k.parse().unwrap())
            .collect();
        let text = render(true, |r, out| r.partitions(out, &window, &keys));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["zone"], "America/Regina");
        assert_eq!(value["partitions"], json!(["2025-10-04", "2025-10-05"]));
    }

    #[test]
    fn instant_as_text() {
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 4, 0, 0).unwrap();
        let text = render(false, |r, out| r.instant(out, at));
        assert_eq!(text, "2025-01-01 22:00 (America/Regina, partition 2025-01-01)\n");
    }

    #[test]
    fn instant_without_partition_is_an_error() {
        let renderer = Renderer::new(
            Zone::parse("Asia/Tokyo").unwrap(),
            &DisplaySettings::default(),
            false,
        );
        // 10000-01-01 01:00 in Tokyo.
        let at = Utc.with_ymd_and_hms(9999, 12, 31, 16, 0, 0).unwrap();
        let mut out = Vec::new();
        let err = renderer.instant(&mut out, at).unwrap_err();
        assert!(err.is_invalid_schedule());
        assert!(out.is_empty());
    }
}
