//! Text forms of numbers and dates on the wire.
//!
//! Numbers travel as decimal strings. Integral values are written without a
//! fractional part so `122.0` and `122` produce the same payload. Dates
//! travel as epoch milliseconds.

use chrono::{DateTime, NaiveDate, Utc};

/// Format an f64 as a wire number string.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    // Normalize -0.0 to 0.
    let value = if value == 0.0 { 0.0_f64 } else { value };
    value.to_string()
}

/// Parse a wire number string. Returns `None` for non-numeric payloads.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Encode a date as epoch milliseconds.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.timestamp_millis().to_string()
}

/// Decode an epoch-milliseconds payload into a date.
///
/// Fractional milliseconds are truncated.
pub fn parse_date_millis(text: &str) -> Option<DateTime<Utc>> {
    let millis = parse_number(text)?;
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis.trunc() as i64)
}

/// Parse a human-readable date string.
///
/// Accepts RFC 3339, then RFC 2822, then a bare `YYYY-MM-DD` taken as
/// midnight UTC.
pub fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(d) = DateTime::parse_from_rfc3339(text) {
        return Some(d.with_timezone(&Utc));
    }
    if let Ok(d) = DateTime::parse_from_rfc2822(text) {
        return Some(d.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
