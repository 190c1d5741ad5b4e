//! Timestamp parsing and formatting for the flight directory wire format.
//!
//! The server stores departure times as UTC without an offset
//! (`2026-02-11T01:29:13`), sometimes with fractional seconds or a trailing
//! `Z`. Forms take local wall-clock input in the `YYYY-MM-DDTHH:MM` shape.

use crate::error::{Error, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parse a server timestamp, interpreting offset-less values as UTC
pub fn parse_utc(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = trimmed.strip_suffix('Z').unwrap_or(trimmed);
    parse_naive(naive)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| Error::InvalidTimestamp {
            value: value.to_string(),
        })
}

/// Parse local `datetime-local` form input and convert it to UTC
pub fn parse_local_input(value: &str) -> Result<DateTime<Utc>> {
    parse_input_in(value, &Local)
}

/// Same as [`parse_local_input`] with an explicit zone
pub fn parse_input_in<Tz: TimeZone>(value: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    let invalid = || Error::InvalidTimestamp {
        value: value.to_string(),
    };

    let naive = parse_naive(value.trim()).ok_or_else(invalid)?;
    // Ambiguous wall-clock times (DST fold) take the earlier instant
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(invalid)
}

/// `YYYY-MM-DDTHH:MM:SSZ`, the shape sent in request bodies
pub fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// `YYYY-MM-DD HH:MM` used in list labels
pub fn format_short(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

/// Reference date filter value, `YYYY-MM-DD`
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidTimestamp {
        value: value.to_string(),
    })
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Serde adapter for server timestamps
pub mod serde_utc {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_utc(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_utc(&raw).map_err(serde::de::Error::custom)
    }
}
