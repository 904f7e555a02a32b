//! Movement timestamp handling

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date placeholder for movements without a timestamp
pub const NO_DATE: &str = "S/F";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a `created_at` value.
///
/// Timestamps with an offset keep their wall-clock time in that offset.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    // Postgres style: "2024-05-01 10:30:00.123+00"
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.naive_local());
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Spreadsheet date cell: `DD/MM/YYYY HH:MM`, empty when there is no date
pub fn sheet_date(raw: Option<&str>) -> CoreResult<Option<String>> {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(None),
    };
    parse_timestamp(raw)
        .map(|dt| Some(dt.format("%d/%m/%Y %H:%M").to_string()))
        .ok_or_else(|| CoreError::InvalidDate { value: raw.to_string() })
}

/// PDF date cell: the first ten characters of the raw value
pub fn short_date(raw: Option<&str>) -> String {
    match raw {
        Some(raw) if !raw.is_empty() => raw.chars().take(10).collect(),
        _ => NO_DATE.to_string(),
    }
}
