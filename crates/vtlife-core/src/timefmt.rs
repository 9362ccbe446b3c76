//! Time-string parsing shared by plans, mail payloads and the presentation bridge.
//!
//! Supported inputs:
//! - `"HH:MM"` (or `"H:MM"`), a local time of day
//! - `"YYYY-MM-DD HH:MM"`, `"YYYY-MM-DD HH:MM:SS"` and ISO-8601 `"YYYY-MM-DDTHH:MM[:SS]"`

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Minute-precision format used in mail payloads.
pub const MINUTE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Clock-face format used for time updates and task windows.
pub const CLOCK_FORMAT: &str = "%H:%M";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse a bare `"HH:MM"` time of day.
pub fn parse_clock(s: &str) -> Option<NaiveTime> {
    let (h, m) = s.trim().split_once(':')?;
    let hour: u32 = h.trim().parse().ok()?;
    let minute: u32 = m.trim().parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Minutes since midnight for a `"HH:MM"` string.
pub fn clock_minutes(s: &str) -> Option<u32> {
    parse_clock(s).map(|t| t.hour() * 60 + t.minute())
}

/// Parse either a bare `"HH:MM"` (anchored to `fallback_date`) or a full
/// date-time string. Returns `None` for empty or unparsable input.
pub fn parse_time_or_datetime(s: &str, fallback_date: NaiveDate) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.len() <= 5 && s.contains(':') {
        return parse_clock(s).map(|t| fallback_date.and_time(t));
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2077, 1, 2).unwrap()
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(clock_minutes("08:30"), Some(510));
        assert_eq!(clock_minutes("0:05"), Some(5));
        assert_eq!(clock_minutes(" 23:59 "), Some(23 * 60 + 59));
        assert_eq!(clock_minutes("24:00"), None);
        assert_eq!(clock_minutes("12:60"), None);
        assert_eq!(clock_minutes("noon"), None);
        assert_eq!(clock_minutes(""), None);
    }

    #[test]
    fn test_bare_time_uses_fallback_date() {
        let dt = parse_time_or_datetime("14:00", day()).unwrap();
        assert_eq!(dt.to_string(), "2077-01-02 14:00:00");
    }

    #[test]
    fn test_full_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2077, 3, 4)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap();
        assert_eq!(parse_time_or_datetime("2077-03-04 09:15", day()), Some(expected));
        assert_eq!(parse_time_or_datetime("2077-03-04 09:15:00", day()), Some(expected));
        assert_eq!(parse_time_or_datetime("2077-03-04T09:15", day()), Some(expected));
        assert_eq!(parse_time_or_datetime("2077-03-04T09:15:00", day()), Some(expected));
    }

    #[test]
    fn test_garbage_is_none() {
        assert!(parse_time_or_datetime("tomorrow-ish", day()).is_none());
        assert!(parse_time_or_datetime("   ", day()).is_none());
        assert!(parse_time_or_datetime("99:99", day()).is_none());
    }
}
