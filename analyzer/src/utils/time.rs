//! Time utility functions

use chrono::{DateTime, Utc};

/// Parse an ISO 8601 / RFC 3339 timestamp string to DateTime<Utc>
pub fn parse_iso_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Absolute difference between two ISO 8601 timestamps, in seconds.
///
/// None when either timestamp does not parse.
pub fn latency_seconds(begin: &str, end: &str) -> Option<f64> {
    let begin = parse_iso_timestamp(begin)?;
    let end = parse_iso_timestamp(end)?;
    let millis = (end - begin).num_milliseconds().abs();
    Some(millis as f64 / 1000.0)
}
