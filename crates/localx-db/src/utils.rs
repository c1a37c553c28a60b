//! Shared utility functions

use chrono::{DateTime, NaiveDateTime, Utc};

/// Wire and storage format for booking dates (no timezone)
pub const BOOKING_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a datetime string (RFC3339 format) or return current time
///
/// Audit timestamps are written by this crate, so a parse failure only
/// happens on hand-edited rows; falling back keeps those rows readable.
pub fn parse_datetime_or_now(s: &str) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Parse a booking date in `%Y-%m-%dT%H:%M:%S` form
pub fn parse_booking_date(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), BOOKING_DATE_FORMAT).ok()
}

/// Format a booking date for storage and responses
pub fn format_booking_date(date: &NaiveDateTime) -> String {
    date.format(BOOKING_DATE_FORMAT).to_string()
}
