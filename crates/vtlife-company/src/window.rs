//! Shoot window resolution.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use vtlife_core::timefmt::parse_time_or_datetime;

/// Defaults applied when a project does not state a usable preference.
#[derive(Debug, Clone, Copy)]
pub struct WindowDefaults {
    pub shoot_hour: u32,
    pub duration: Duration,
}

impl Default for WindowDefaults {
    fn default() -> Self {
        Self {
            shoot_hour: 10,
            duration: Duration::hours(2),
        }
    }
}

/// Start and end of a scheduled shoot; `end` is always after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShootWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ShootWindow {
    /// Resolve a project's preferred window relative to virtual time `now`.
    ///
    /// Bare "HH:MM" values land on the next virtual day. Values that do not
    /// parse count as absent.
    pub fn resolve(
        preferred_start: Option<&str>,
        preferred_end: Option<&str>,
        now: NaiveDateTime,
        defaults: WindowDefaults,
    ) -> Self {
        let shoot_date = now.date().succ_opt().unwrap_or(now.date());
        let parse = |value: Option<&str>, label: &str| {
            let raw = value?;
            let parsed = parse_time_or_datetime(raw, shoot_date);
            if parsed.is_none() {
                tracing::warn!("⚠️ Ignoring unparsable preferred {label} time '{raw}'");
            }
            parsed
        };
        let start = parse(preferred_start, "start");
        let end = parse(preferred_end, "end");

        let default_start = shoot_date.and_time(
            NaiveTime::from_hms_opt(defaults.shoot_hour, 0, 0).unwrap_or_default(),
        );
        let fallback = || Self {
            start: default_start,
            end: default_start
                .checked_add_signed(defaults.duration)
                .unwrap_or(default_start),
        };

        let start = start.unwrap_or(default_start);
        let Some(default_end) = start.checked_add_signed(defaults.duration) else {
            tracing::warn!("⚠️ Preferred start {start} is out of range, using the default window");
            return fallback();
        };
        let end = end.unwrap_or(default_end);

        if end <= start {
            tracing::warn!("⚠️ Preferred window ends before it starts, using {start} + default duration");
            return Self { start, end: default_end };
        }
        Self { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2077, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn next_day(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2077, 1, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn resolve(start: Option<&str>, end: Option<&str>) -> ShootWindow {
        ShootWindow::resolve(start, end, now(), WindowDefaults::default())
    }

    #[test]
    fn test_no_preference_uses_default_window() {
        let w = resolve(None, None);
        assert_eq!((w.start, w.end), (next_day(10, 0), next_day(12, 0)));
    }

    #[test]
    fn test_start_only_adds_two_hours() {
        let w = resolve(Some("14:00"), None);
        assert_eq!((w.start, w.end), (next_day(14, 0), next_day(16, 0)));
    }

    #[test]
    fn test_backwards_window_is_forced_forward() {
        let w = resolve(Some("20:00"), Some("19:00"));
        assert_eq!((w.start, w.end), (next_day(20, 0), next_day(22, 0)));
    }

    #[test]
    fn test_equal_start_and_end_is_forced_forward() {
        let w = resolve(Some("09:00"), Some("09:00"));
        assert_eq!(w.end, next_day(11, 0));
    }

    #[test]
    fn test_full_datetimes_are_taken_verbatim() {
        let w = resolve(Some("2077-03-05 13:30"), Some("2077-03-05T15:00:00"));
        let day = NaiveDate::from_ymd_opt(2077, 3, 5).unwrap();
        assert_eq!(w.start, day.and_hms_opt(13, 30, 0).unwrap());
        assert_eq!(w.end, day.and_hms_opt(15, 0, 0).unwrap());
    }

    #[test]
    fn test_garbage_falls_back_to_defaults() {
        let w = resolve(Some("after lunch"), Some("??"));
        assert_eq!((w.start, w.end), (next_day(10, 0), next_day(12, 0)));
    }

    #[test]
    fn test_end_only_keeps_default_start() {
        let w = resolve(None, Some("15:00"));
        assert_eq!((w.start, w.end), (next_day(10, 0), next_day(15, 0)));
    }

    #[test]
    fn test_start_near_max_date_falls_back_to_defaults() {
        let w = resolve(Some("+262142-12-31 23:00"), None);
        assert_eq!((w.start, w.end), (next_day(10, 0), next_day(12, 0)));
    }

    #[test]
    fn test_custom_defaults() {
        let defaults = WindowDefaults {
            shoot_hour: 13,
            duration: Duration::hours(3),
        };
        let w = ShootWindow::resolve(None, None, now(), defaults);
        assert_eq!((w.start, w.end), (next_day(13, 0), next_day(16, 0)));
    }
}
