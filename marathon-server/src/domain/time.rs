//! Clock-time handling for showtimes and user time bounds.
//!
//! Showtimes are theater-local and carry no timezone. User-facing time
//! bounds arrive as "HH:MM" strings, or as "any" when unconstrained.

use chrono::{NaiveDateTime, NaiveTime, Timelike};

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse a time of day from "HH:MM" format.
///
/// # Examples
///
/// ```
/// use marathon_server::domain::parse_hhmm;
///
/// assert!(parse_hhmm("00:00").is_ok());
/// assert!(parse_hhmm("23:59").is_ok());
///
/// assert!(parse_hhmm("1430").is_err());
/// assert!(parse_hhmm("14:3").is_err());
/// assert!(parse_hhmm("25:00").is_err());
/// ```
pub fn parse_hhmm(s: &str) -> Result<NaiveTime, TimeError> {
    // Must be exactly 5 characters: HH:MM
    if s.len() != 5 {
        return Err(TimeError::new("expected HH:MM format"));
    }

    let bytes = s.as_bytes();

    if bytes[2] != b':' {
        return Err(TimeError::new("expected colon at position 2"));
    }

    let hour =
        parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
    if hour > 23 {
        return Err(TimeError::new("hour must be 0-23"));
    }

    let minute =
        parse_two_digits(&bytes[3..5]).ok_or_else(|| TimeError::new("invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| TimeError::new("invalid time"))
}

/// Parse an optional time bound: "any" (any case), "any time" or an empty
/// string mean unconstrained.
pub fn parse_time_bound(s: &str) -> Result<Option<NaiveTime>, TimeError> {
    let trimmed = s.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("any")
        || trimmed.eq_ignore_ascii_case("any time")
    {
        return Ok(None);
    }
    parse_hhmm(trimmed).map(Some)
}

/// Whether `time` is the 23:59 "end of day" sentinel.
pub fn is_end_of_day(time: NaiveTime) -> bool {
    time.hour() == 23 && time.minute() == 59
}

/// Format a showtime as a 12-hour clock, e.g. "7:30 PM".
pub fn format_clock(at: NaiveDateTime) -> String {
    at.format("%-I:%M %p").to_string()
}

fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    match bytes {
        [a @ b'0'..=b'9', b @ b'0'..=b'9'] => Some(u32::from(a - b'0') * 10 + u32::from(b - b'0')),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn parse_valid() {
        assert_eq!(parse_hhmm("09:05").unwrap(), NaiveTime::from_hms_opt(9, 5, 0).unwrap());
        assert_eq!(parse_hhmm("23:59").unwrap(), NaiveTime::from_hms_opt(23, 59, 0).unwrap());
    }

    #[test]
    fn parse_invalid() {
        assert!(parse_hhmm("").is_err());
        assert!(parse_hhmm("9:05").is_err());
        assert!(parse_hhmm("09-05").is_err());
        assert!(parse_hhmm("24:00").is_err());
        assert!(parse_hhmm("12:60").is_err());
        assert!(parse_hhmm("ab:cd").is_err());
    }

    #[test]
    fn bound_any() {
        assert_eq!(parse_time_bound("any").unwrap(), None);
        assert_eq!(parse_time_bound("Any Time").unwrap(), None);
        assert_eq!(parse_time_bound("  ").unwrap(), None);
        assert_eq!(
            parse_time_bound("18:30").unwrap(),
            Some(NaiveTime::from_hms_opt(18, 30, 0).unwrap())
        );
        assert!(parse_time_bound("whenever").is_err());
    }

    #[test]
    fn end_of_day_sentinel() {
        assert!(is_end_of_day(NaiveTime::from_hms_opt(23, 59, 0).unwrap()));
        assert!(!is_end_of_day(NaiveTime::from_hms_opt(23, 55, 0).unwrap()));
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(at(19, 30)), "7:30 PM");
        assert_eq!(format_clock(at(0, 5)), "12:05 AM");
        assert_eq!(format_clock(at(11, 0)), "11:00 AM");
        assert_eq!(format_clock(at(12, 45)), "12:45 PM");
    }

    #[test]
    fn error_display() {
        let err = parse_hhmm("25:00").unwrap_err();
        assert_eq!(err.to_string(), "invalid time: hour must be 0-23");
    }
}
