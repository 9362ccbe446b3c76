//! Virtual clock: accelerated simulated time, persisted across restarts.
//!
//! `ratio` is simulated minutes per real second. The clock keeps the total
//! real time observed since it was loaded and derives the anchor from that
//! total, so one long tick and many short ticks land on the same instant.

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use vtlife_core::{JsonFile, Result};
use vtlife_core::timefmt::CLOCK_FORMAT;

/// On-disk clock record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockState {
    #[serde(alias = "datetime")]
    pub anchor: NaiveDateTime,
}

/// Simulated clock advanced by real elapsed time.
#[derive(Debug)]
pub struct VirtualClock {
    /// Anchor at load time; `anchor` is always derived from it.
    base: NaiveDateTime,
    anchor: NaiveDateTime,
    ratio: f64,
    real_elapsed: Duration,
    last_sample: Instant,
    state: Option<JsonFile>,
}

impl VirtualClock {
    /// Day 1, 08:00. Where a fresh world starts.
    pub fn epoch() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2077, 1, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .unwrap_or_default()
    }

    /// In-memory clock starting at `anchor`.
    pub fn new(anchor: NaiveDateTime, ratio: f64) -> Self {
        Self {
            base: anchor,
            anchor,
            ratio: sanitize_ratio(ratio),
            real_elapsed: Duration::ZERO,
            last_sample: Instant::now(),
            state: None,
        }
    }

    /// Restore the clock from `path`, seeding the epoch when the file is
    /// missing or unreadable. Never fails.
    pub fn load(path: &Path, ratio: f64) -> Self {
        let file = JsonFile::new(path);
        let anchor = match file.load::<ClockState>() {
            Ok(Some(state)) => {
                tracing::info!("🕰️ Virtual clock restored at {}", state.anchor);
                Some(state.anchor)
            }
            Ok(None) => {
                tracing::info!("🕰️ No clock state at {}, starting at epoch", path.display());
                None
            }
            Err(e) => {
                tracing::warn!("⚠️ Clock state unreadable ({e}), resetting to epoch");
                None
            }
        };
        let seeded = anchor.is_none();
        let mut clock = Self::new(anchor.unwrap_or_else(Self::epoch), ratio);
        clock.state = Some(file);
        if seeded {
            if let Err(e) = clock.persist() {
                tracing::warn!("⚠️ Failed to save seeded clock: {e}");
            }
        }
        clock
    }

    /// Sample real time since the previous sample and advance.
    pub fn tick(&mut self) {
        let sample = Instant::now();
        let elapsed = sample.saturating_duration_since(self.last_sample);
        self.last_sample = sample;
        self.advance(elapsed);
    }

    /// Advance by an explicit amount of real time.
    pub fn advance(&mut self, real: Duration) {
        self.real_elapsed = self.real_elapsed.saturating_add(real);
        let simulated_micros = self.real_elapsed.as_secs_f64() * self.ratio * 60.0 * 1_000_000.0;
        let delta = chrono::Duration::microseconds(simulated_micros.min(i64::MAX as f64) as i64);
        match self.base.checked_add_signed(delta) {
            Some(next) if next > self.anchor => self.anchor = next,
            Some(_) => {}
            None => tracing::warn!("⚠️ Virtual clock overflow, holding at {}", self.anchor),
        }
    }

    /// Write the anchor to the state file (no-op for in-memory clocks).
    pub fn persist(&self) -> Result<()> {
        match &self.state {
            Some(file) => file.save(&ClockState { anchor: self.anchor }),
            None => Ok(()),
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.anchor
    }

    pub fn hour(&self) -> u32 {
        self.anchor.hour()
    }

    pub fn minute(&self) -> u32 {
        self.anchor.minute()
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// "HH:MM" of the current virtual time.
    pub fn clock_face(&self) -> String {
        self.anchor.format(CLOCK_FORMAT).to_string()
    }
}

fn sanitize_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio >= 0.0 {
        ratio
    } else {
        tracing::warn!("⚠️ Invalid clock ratio {ratio}, clock will not advance");
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2077, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_advance_scales_by_ratio() {
        let mut clock = VirtualClock::new(at(8, 0), 5.0);
        clock.advance(Duration::from_secs(12));
        assert_eq!(clock.now(), at(9, 0));
        assert_eq!(clock.hour(), 9);
        assert_eq!(clock.minute(), 0);
        assert_eq!(clock.clock_face(), "09:00");
    }

    #[test]
    fn test_additivity_across_tick_granularity() {
        let mut one = VirtualClock::new(at(8, 0), 7.3);
        one.advance(Duration::from_millis(10_000));

        let mut many = VirtualClock::new(at(8, 0), 7.3);
        for _ in 0..1000 {
            many.advance(Duration::from_millis(7));
        }
        many.advance(Duration::from_millis(3_000));

        assert_eq!(one.now(), many.now());
    }

    #[test]
    fn test_anchor_never_decreases() {
        let mut clock = VirtualClock::new(at(8, 0), 1.0);
        let mut last = clock.now();
        for ms in [0, 1, 250, 0, 999, 5] {
            clock.advance(Duration::from_millis(ms));
            assert!(clock.now() >= last);
            last = clock.now();
        }
        clock.tick();
        assert!(clock.now() >= last);
    }

    #[test]
    fn test_zero_ratio_freezes_time() {
        let mut clock = VirtualClock::new(at(8, 0), 0.0);
        clock.advance(Duration::from_secs(3600));
        assert_eq!(clock.now(), at(8, 0));
    }

    #[test]
    fn test_missing_state_seeds_epoch_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game_time.json");
        let clock = VirtualClock::load(&path, 5.0);
        assert_eq!(clock.now(), VirtualClock::epoch());
        assert!(path.exists());
    }

    #[test]
    fn test_corrupt_state_resets_to_epoch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game_time.json");
        std::fs::write(&path, "garbage").unwrap();
        let clock = VirtualClock::load(&path, 5.0);
        assert_eq!(clock.now(), VirtualClock::epoch());
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game_time.json");
        let mut clock = VirtualClock::load(&path, 5.0);
        clock.advance(Duration::from_secs(30));
        clock.persist().unwrap();
        let expected = clock.now();

        let restored = VirtualClock::load(&path, 5.0);
        assert_eq!(restored.now(), expected);
        assert_eq!(restored.now(), at(10, 30));
    }

    #[test]
    fn test_legacy_datetime_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game_time.json");
        std::fs::write(&path, r#"{"datetime": "2077-01-03T21:15:00"}"#).unwrap();
        let clock = VirtualClock::load(&path, 5.0);
        assert_eq!(clock.hour(), 21);
        assert_eq!(clock.minute(), 15);
    }
}
