//! Timestamp formatting for stored records and their display form.
//!
//! Records store one canonical timestamp format (RFC 3339). The 12-hour
//! clock form is display-only and produced at render time.

use chrono::{DateTime, NaiveDateTime, Utc};

/// 24-hour form written by earlier versions of the ingestion path. Still
/// accepted when reformatting for display.
pub const LEGACY_STORED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DISPLAY_FORMAT: &str = "%I:%M %p";

/// Canonical stored form of an instant.
pub fn format_stored(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339()
}

/// 12-hour clock form of an instant, e.g. `03:45 PM`.
pub fn format_display(instant: DateTime<Utc>) -> String {
    instant.format(DISPLAY_FORMAT).to_string()
}

/// Re-render a stored timestamp in the 12-hour display form.
///
/// Accepts the canonical RFC 3339 form and the legacy 24-hour form. A
/// string that parses as neither is returned unchanged; a record with an
/// unreadable timestamp still displays rather than erroring.
pub fn parse_and_reformat(stored: &str) -> String {
    if let Ok(instant) = DateTime::parse_from_rfc3339(stored) {
        return instant.format(DISPLAY_FORMAT).to_string();
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(stored, LEGACY_STORED_FORMAT) {
        return naive.format(DISPLAY_FORMAT).to_string();
    }

    stored.to_string()
}
