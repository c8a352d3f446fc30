//! Parser for `Timestamp:` header lines.
//!
//! The benchmark script writes the output of `date` before each `crictl stats`
//! run:
//!
//! ```text
//! Timestamp: Thu Aug 28 07:07:37 AM UTC 2025
//! ```
//!
//! The zone abbreviation is checked but not interpreted; parsed times are naive.

use chrono::{NaiveDateTime, Weekday};

/// Prefix marking a header line.
pub const TIMESTAMP_PREFIX: &str = "Timestamp:";

/// `date` layout with the weekday and zone tokens removed.
const HEADER_FORMAT: &str = "%b %d %I:%M:%S %p %Y";

/// Number of whitespace-separated fields in a `date` string.
const HEADER_FIELDS: usize = 7;

/// Position of the weekday name among the header fields.
const WEEKDAY_FIELD: usize = 0;

/// Position of the zone abbreviation among the header fields.
const ZONE_FIELD: usize = 5;

/// Which zone abbreviations a header may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneRule {
    /// Any alphabetic abbreviation (`UTC`, `CEST`, ...).
    AnyAbbreviation,
    /// Only the literal `UTC`.
    UtcOnly,
}

/// Error type for header timestamp failures.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampParseError {
    pub input: String,
    pub message: String,
}

impl TimestampParseError {
    fn new(input: &str, message: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for TimestampParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse timestamp '{}': {}", self.input, self.message)
    }
}

impl std::error::Error for TimestampParseError {}

/// Returns the text after `Timestamp:` if `line` is a header line.
pub fn strip_header(line: &str) -> Option<&str> {
    line.trim().strip_prefix(TIMESTAMP_PREFIX).map(str::trim)
}

/// Parses the text of a header (without the `Timestamp:` prefix).
///
/// The weekday must be a valid name but is not checked against the date.
pub fn parse_header_time(text: &str, zone: ZoneRule) -> Result<NaiveDateTime, TimestampParseError> {
    let text = text.trim();
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != HEADER_FIELDS {
        return Err(TimestampParseError::new(
            text,
            format!("expected {} fields, found {}", HEADER_FIELDS, fields.len()),
        ));
    }

    let weekday = fields[WEEKDAY_FIELD];
    if weekday.parse::<Weekday>().is_err() {
        return Err(TimestampParseError::new(
            text,
            format!("invalid weekday '{}'", weekday),
        ));
    }

    let zone_name = fields[ZONE_FIELD];
    let zone_ok = match zone {
        ZoneRule::AnyAbbreviation => zone_name.chars().all(|c| c.is_ascii_alphabetic()),
        ZoneRule::UtcOnly => zone_name == "UTC",
    };
    if !zone_ok {
        return Err(TimestampParseError::new(
            text,
            format!("unexpected time zone '{}'", zone_name),
        ));
    }

    // `date` pads single-digit days with a space; rejoining also normalizes that.
    let date_fields: Vec<&str> = fields
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != WEEKDAY_FIELD && i != ZONE_FIELD)
        .map(|(_, f)| *f)
        .collect();

    NaiveDateTime::parse_from_str(&date_fields.join(" "), HEADER_FORMAT)
        .map_err(|e| TimestampParseError::new(text, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDateTime::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            NaiveTime::from_hms_opt(h, min, s).unwrap(),
        )
    }

    #[test]
    fn test_strip_header() {
        assert_eq!(
            strip_header("  Timestamp: Thu Aug 28 07:07:37 AM UTC 2025 "),
            Some("Thu Aug 28 07:07:37 AM UTC 2025")
        );
        assert_eq!(strip_header("Timestamp:"), Some(""));
        assert_eq!(strip_header("abc flask 0.1 1MB"), None);
    }

    #[test]
    fn test_parse_morning() {
        let ts = parse_header_time("Thu Aug 28 07:07:37 AM UTC 2025", ZoneRule::UtcOnly).unwrap();
        assert_eq!(ts, datetime(2025, 8, 28, 7, 7, 37));
    }

    #[test]
    fn test_parse_afternoon() {
        let ts = parse_header_time("Thu Aug 28 01:15:00 PM UTC 2025", ZoneRule::UtcOnly).unwrap();
        assert_eq!(ts, datetime(2025, 8, 28, 13, 15, 0));
    }

    #[test]
    fn test_parse_space_padded_day() {
        let ts = parse_header_time("Tue Sep  2 10:00:00 AM UTC 2025", ZoneRule::UtcOnly).unwrap();
        assert_eq!(ts, datetime(2025, 9, 2, 10, 0, 0));
    }

    #[test]
    fn test_weekday_not_checked_against_date() {
        let ts = parse_header_time("Mon Aug 28 07:07:37 AM UTC 2025", ZoneRule::UtcOnly).unwrap();
        assert_eq!(ts, datetime(2025, 8, 28, 7, 7, 37));
    }

    #[test]
    fn test_invalid_weekday() {
        let err = parse_header_time("Xyz Aug 28 07:07:37 AM UTC 2025", ZoneRule::UtcOnly).unwrap_err();
        assert!(err.message.contains("invalid weekday"));
    }

    #[test]
    fn test_zone_rules() {
        let text = "Thu Aug 28 07:07:37 AM CEST 2025";
        assert!(parse_header_time(text, ZoneRule::AnyAbbreviation).is_ok());
        let err = parse_header_time(text, ZoneRule::UtcOnly).unwrap_err();
        assert!(err.message.contains("CEST"));
    }

    #[test]
    fn test_wrong_field_count() {
        let err = parse_header_time("2025-08-28 07:07:37", ZoneRule::AnyAbbreviation).unwrap_err();
        assert!(err.message.contains("expected 7 fields"));
    }

    #[test]
    fn test_invalid_time() {
        assert!(parse_header_time("Thu Aug 28 25:07:37 AM UTC 2025", ZoneRule::UtcOnly).is_err());
        assert!(parse_header_time("Foo Bar 28 07:07:37 AM UTC 2025", ZoneRule::UtcOnly).is_err());
    }
}
