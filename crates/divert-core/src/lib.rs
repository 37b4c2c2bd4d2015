//! Core types: civil time, recurrence, window planning, payloads

pub mod civil;
pub mod divert;
pub mod error;
pub mod payload;
pub mod recurrence;
pub mod stored;
pub mod tracing;
pub mod window;

pub use civil::{
    CivilDate, CivilStyle, CivilTimeOfDay, DEFAULT_ZONE_ID, DayKey, Instant, TimeFormat, Zone,
    civil_parts, day_key_of, format_civil, format_civil_with, parse_civil_datetime,
    resolve_local, to_instant, today_key,
};
pub use divert::{DivertKind, DivertSource, DivertStatus, ReporterTier};
pub use error::{DivertError, DivertResult};
pub use payload::{ClearUpdate, DivertPayload, ReportMeta, build_payloads};
pub use recurrence::{Occurrence, Schedule, expand, is_overnight, single};
pub use stored::{DivertRecord, StoredInstant};
pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use window::{DEFAULT_BACKFILL_DAYS, Window, partitions_to_scan, select_active};
