//! Timestamp rendering

use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render an ISO-8601 timestamp in `tz` as `yyyy-MM-dd HH:mm:ss (Zone/Name)`
///
/// Timestamps without an offset are read as local time in `tz`. Input that
/// cannot be parsed is returned unchanged; empty input yields `None`.
pub fn format_datetime(iso: Option<&str>, tz: Tz) -> Option<String> {
    let raw = iso.map(str::trim).filter(|s| !s.is_empty())?;

    let local = match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => Some(parsed.with_timezone(&tz)),
        Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .and_then(|naive| tz.from_local_datetime(&naive).earliest()),
    };

    Some(match local {
        Some(dt) => format!("{} ({})", dt.format(DISPLAY_FORMAT), tz.name()),
        None => raw.to_string(),
    })
}
