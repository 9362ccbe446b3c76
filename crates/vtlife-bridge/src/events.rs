//! Presentation events: one JSON object per line, tagged by `event`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use vtlife_core::config::Weather;
use vtlife_core::timefmt::{CLOCK_FORMAT, MINUTE_FORMAT};

/// Scene lighting shown by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    Day,
    Evening,
    Night,
    Rainday,
    Rainnight,
}

impl BackgroundMode {
    pub fn for_hour(hour: u32, weather: Weather) -> Self {
        match weather {
            Weather::Sunshine => match hour {
                h if h >= 20 || h < 5 => BackgroundMode::Night,
                17..=19 => BackgroundMode::Evening,
                _ => BackgroundMode::Day,
            },
            Weather::Rain => {
                if hour >= 19 || hour < 7 {
                    BackgroundMode::Rainnight
                } else {
                    BackgroundMode::Rainday
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskAction {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PresentationEvent {
    TimeUpdate {
        time: String,
    },
    Background {
        mode: BackgroundMode,
    },
    Task {
        action: TaskAction,
        #[serde(rename = "type")]
        kind: String,
        category: String,
        game_time: String,
    },
}

impl PresentationEvent {
    pub fn time_update(now: NaiveDateTime) -> Self {
        PresentationEvent::TimeUpdate {
            time: now.format(CLOCK_FORMAT).to_string(),
        }
    }

    pub fn task(kind: &str, category: &str, is_start: bool, now: NaiveDateTime) -> Self {
        PresentationEvent::Task {
            action: if is_start { TaskAction::Start } else { TaskAction::End },
            kind: kind.to_string(),
            category: category.to_string(),
            game_time: now.format(MINUTE_FORMAT).to_string(),
        }
    }
}

/// Emits a background event only when the mode changes.
#[derive(Debug, Clone)]
pub struct BackgroundTracker {
    weather: Weather,
    current: Option<BackgroundMode>,
}

impl BackgroundTracker {
    pub fn new(weather: Weather) -> Self {
        Self {
            weather,
            current: None,
        }
    }

    pub fn observe(&mut self, hour: u32) -> Option<PresentationEvent> {
        let mode = BackgroundMode::for_hour(hour, self.weather);
        if self.current == Some(mode) {
            return None;
        }
        tracing::info!("🌅 Background changed to {mode:?}");
        self.current = Some(mode);
        Some(PresentationEvent::Background { mode })
    }
}
