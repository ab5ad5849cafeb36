//! Timestamp handling for dbt artifact documents.
//!
//! dbt artifacts record timestamps as UTC with fractional seconds and a
//! trailing `Z` (e.g. `2022-07-27T09:07:49.547633Z`). JUnit consumers want
//! seconds precision without a zone marker, so parsing truncates.

use crate::error::{DbtJunitError, Result};
use chrono::{NaiveDateTime, Timelike};

/// The fixed timestamp format dbt writes into its artifacts.
const DBT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Format used for timestamps in the emitted report.
const REPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a dbt artifact timestamp, dropping sub-second precision and the
/// zone marker.
///
/// # Errors
///
/// Returns [`DbtJunitError::InvalidTimestamp`] when the value does not match
/// the dbt artifact format.
pub fn parse_dbt_timestamp(value: &str) -> Result<NaiveDateTime> {
    let parsed = NaiveDateTime::parse_from_str(value, DBT_TIMESTAMP_FORMAT).map_err(|err| {
        DbtJunitError::InvalidTimestamp {
            value: value.to_string(),
            reason: err.to_string(),
        }
    })?;
    // 0 ns is always valid.
    Ok(parsed.with_nanosecond(0).unwrap_or(parsed))
}

/// Render a timestamp in the seconds-precision report format.
#[must_use]
pub fn format_report_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(REPORT_TIMESTAMP_FORMAT).to_string()
}
