//! Date/time helpers for API timestamps.

use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC datetime as RFC3339 with millisecond precision and a `Z` suffix.
///
/// e.g. `2024-01-15T10:30:00.123Z`
pub fn to_iso_millis(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Format a filesystem timestamp (e.g. mtime) the same way as [`to_iso_millis`].
pub fn system_time_to_iso(time: SystemTime) -> String {
    to_iso_millis(&DateTime::<Utc>::from(time))
}
