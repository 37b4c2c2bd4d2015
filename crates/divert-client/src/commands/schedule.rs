//! Schedule expansion commands.

use std::io::Write;

use divert_core::{CivilDate, CivilTimeOfDay, DivertKind, ReportMeta, Schedule, build_payloads};
use tracing::debug;

use super::Context;
use crate::cli::ReportArgs;
use crate::error::{ClientError, ClientResult};

/// Expands a recurring daily window.
pub fn expand(
    ctx: &Context,
    out: &mut impl Write,
    from: &str,
    to: &str,
    daily_start: &str,
    daily_end: &str,
    report: &ReportArgs,
) -> ClientResult<()> {
    let schedule = Schedule::Recurring {
        start_date: from.parse()?,
        end_date: to.parse()?,
        daily_start: daily_start.parse()?,
        daily_end: daily_end.parse()?,
    };
    emit(ctx, out, &schedule, report)
}

/// Builds a single occurrence, open-ended unless both end fields are given.
pub fn single(
    ctx: &Context,
    out: &mut impl Write,
    date: &str,
    time: &str,
    end_date: Option<&str>,
    end_time: Option<&str>,
    report: &ReportArgs,
) -> ClientResult<()> {
    let schedule = Schedule::Single {
        start_date: date.parse()?,
        start_time: time.parse()?,
        end_date: end_date.map(str::parse::<CivilDate>).transpose()?,
        end_time: end_time.map(str::parse::<CivilTimeOfDay>).transpose()?,
    };
    emit(ctx, out, &schedule, report)
}

fn emit(
    ctx: &Context,
    out: &mut impl Write,
    schedule: &Schedule,
    report: &ReportArgs,
) -> ClientResult<()> {
    let renderer = ctx.renderer();
    match report_meta(report)? {
        Some(meta) => {
            let payloads = build_payloads(schedule, &meta, &ctx.zone)?;
            debug!(hospital = %meta.hospital_id, count = payloads.len(), "built payloads");
            renderer.payloads(out, &payloads)
        }
        None => renderer.occurrences(out, &schedule.occurrences(&ctx.zone)?),
    }
}

fn report_meta(report: &ReportArgs) -> ClientResult<Option<ReportMeta>> {
    let Some(hospital) = report.hospital.as_deref() else {
        return Ok(None);
    };
    let kind: DivertKind = report.kind.parse().map_err(ClientError::Input)?;
    let mut meta = ReportMeta::user(hospital, kind, report.reporter_uid.clone());
    if let Some(notes) = report.notes.as_deref() {
        meta = meta.with_notes(notes);
    }
    Ok(Some(meta))
}
