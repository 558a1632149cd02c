//! Shared parsing utilities for provider responses.
//!
//! Last-updated markers, calendar dates, and the loosely typed numeric
//! fields that providers emit as numbers, strings, or `"NULL"`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer};

use crate::SourceError;

/// Zone abbreviations providers append to last-updated markers.
const ZONE_OFFSETS: &[(&str, i32)] = &[("EST", -5 * 3600), ("EDT", -4 * 3600)];

/// Datetime layouts seen in last-updated markers, zone suffix removed.
const MARKER_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Looks up the fixed UTC offset for a zone abbreviation.
#[must_use]
pub fn zone_offset(abbreviation: &str) -> Option<FixedOffset> {
    ZONE_OFFSETS
        .iter()
        .find(|(abbr, _)| abbr.eq_ignore_ascii_case(abbreviation))
        .and_then(|(_, secs)| FixedOffset::east_opt(*secs))
}

/// Parses a last-updated marker such as `"2021-03-14 21:06 EDT"`.
///
/// A marker without a trailing zone abbreviation (e.g.
/// `"2021-03-15 20:56:03"`) uses `assumed_zone`.
///
/// # Errors
///
/// Returns [`SourceError::TimestampParse`] if the abbreviation is not in the
/// offset table, no zone is available, or the datetime part is malformed.
pub fn parse_last_updated(
    marker: &str,
    assumed_zone: Option<&str>,
) -> Result<DateTime<FixedOffset>, SourceError> {
    let err = || SourceError::TimestampParse {
        value: marker.to_string(),
    };

    let trimmed = marker.trim();
    let (datetime_part, zone) = match trimmed.rsplit_once(' ') {
        Some((rest, last)) if last.chars().all(|c| c.is_ascii_alphabetic()) => (rest, Some(last)),
        _ => (trimmed, assumed_zone),
    };

    let offset = zone.and_then(zone_offset).ok_or_else(err)?;
    let naive = MARKER_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(datetime_part, fmt).ok())
        .ok_or_else(err)?;

    offset.from_local_datetime(&naive).single().ok_or_else(err)
}

/// Parses a per-day date in either `YYYY-MM-DD` or `DD-MM-YYYY` form.
///
/// # Errors
///
/// Returns [`SourceError::Schema`] if neither layout matches.
pub fn parse_day(s: &str) -> Result<NaiveDate, SourceError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d-%m-%Y"))
        .map_err(|_| SourceError::Schema {
            message: format!("unrecognized date {s:?}"),
        })
}

/// Interprets a JSON value as a count. Returns `None` for `null`, `"NULL"`,
/// empty strings, and anything else that is not a number.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn count_from_value(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// `deserialize_with` helper wrapping [`count_from_value`].
///
/// # Errors
///
/// Only fails if the input is not valid JSON at all.
pub fn lenient_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(count_from_value))
}

/// Converts an optional signed count to an unsigned one, clamping negatives
/// to zero.
#[must_use]
pub fn non_negative(value: Option<i64>) -> Option<u64> {
    value.map(|v| u64::try_from(v.max(0)).unwrap_or(0))
}
