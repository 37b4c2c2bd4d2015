//! Error types for schedule validation and conversion.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type for divert scheduling operations.
pub type DivertResult<T> = Result<T, DivertError>;

/// Errors that can occur while converting or expanding a schedule.
///
/// The first three variants are local validation failures: they are detected
/// before any conversion is attempted and are never retryable.
#[derive(Debug, Error)]
pub enum DivertError {
    /// The timezone identifier is not a known IANA zone.
    #[error("unknown timezone: {0}")]
    InvalidZone(String),

    /// A date or time component is malformed or out of range.
    #[error("invalid {field}: {value}")]
    InvalidCivilField { field: &'static str, value: String },

    /// The end of a schedule falls before its start.
    #[error("invalid range: end {end} is before start {start}")]
    InvalidRange { start: String, end: String },

    /// A stored timestamp could not be decoded.
    #[error("invalid stored timestamp: {0}")]
    InvalidTimestamp(String),

    /// Failed to serialize a payload document.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DivertError {
    /// Creates an invalid civil field error.
    pub fn civil_field(field: &'static str, value: impl ToString) -> Self {
        Self::InvalidCivilField {
            field,
            value: value.to_string(),
        }
    }

    /// Creates an invalid range error from two calendar dates.
    pub fn date_range(start: NaiveDate, end: NaiveDate) -> Self {
        Self::InvalidRange {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    /// Returns true if the error should be shown to the reporter as
    /// "invalid schedule" feedback.
    pub fn is_invalid_schedule(&self) -> bool {
        matches!(
            self,
            Self::InvalidZone(_) | Self::InvalidCivilField { .. } | Self::InvalidRange { .. }
        )
    }
}
