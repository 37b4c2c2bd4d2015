//! Window planning and display commands.

use std::io::Write;

use divert_core::{Instant, Window, partitions_to_scan};
use tracing::debug;

use super::{Context, parse_instant};
use crate::error::ClientResult;

/// Lists the partitions to fetch for a query window.
///
/// A missing start means `now`; a missing end means the configured window
/// length after the start.
pub fn partitions(
    ctx: &Context,
    out: &mut impl Write,
    start: Option<&str>,
    end: Option<&str>,
    backfill: Option<u32>,
    now: Instant,
) -> ClientResult<()> {
    let start = start
        .map(|text| parse_instant(text, &ctx.zone))
        .transpose()?
        .unwrap_or(now);
    let end = match end {
        Some(text) => parse_instant(text, &ctx.zone)?,
        None => Window::next_hours(start, ctx.config.window_hours).end,
    };
    let backfill = backfill.unwrap_or(ctx.config.backfill_days);

    // Inverted windows are passed through unchanged.
    let window = Window { start, end };
    let keys = partitions_to_scan(&window, &ctx.zone, backfill);
    debug!(%start, %end, backfill, count = keys.len(), "planned partitions");
    ctx.renderer().partitions(out, &window, &keys)
}

/// Prints an instant as civil text in the configured zone.
pub fn format(ctx: &Context, out: &mut impl Write, instant: &str) -> ClientResult<()> {
    let instant = parse_instant(instant, &ctx.zone)?;
    ctx.renderer().instant(out, instant)
}
