//! Task definitions: one day's plan and its execution order.

use std::collections::VecDeque;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use vtlife_core::timefmt::clock_minutes;

/// A time-boxed activity as delivered by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub category: String,
    /// Local "HH:MM".
    #[serde(default)]
    pub start_time: String,
    /// Local "HH:MM".
    #[serde(default)]
    pub end_time: String,
    /// Opaque payload for the executor.
    #[serde(default)]
    pub content: serde_json::Value,
    /// Set once the start event has been dispatched.
    #[serde(skip)]
    pub started: bool,
}

impl Task {
    pub fn new(kind: &str, category: &str, start_time: &str, end_time: &str) -> Self {
        Self {
            kind: kind.to_string(),
            category: category.to_string(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            content: serde_json::Value::Null,
            started: false,
        }
    }
}

/// A task with its window resolved against the plan date.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub task: Task,
    pub start: NaiveDateTime,
    /// Never before `start`; malformed windows collapse to `start`.
    pub end: NaiveDateTime,
}

/// The day's execution contract: tasks in ascending start order.
///
/// Only the head is ever inspected or removed; entries are never reordered
/// after normalization.
#[derive(Debug, Clone, Default)]
pub struct DailySchedule {
    date: Option<NaiveDate>,
    entries: VecDeque<ScheduledTask>,
}

impl DailySchedule {
    /// Stable-sort `tasks` by start minutes-since-midnight and anchor each
    /// window to `date`. Tasks whose start time does not parse are dropped.
    pub fn normalize(date: NaiveDate, tasks: Vec<Task>) -> Self {
        let mut keyed: Vec<(u32, Task)> = tasks
            .into_iter()
            .filter_map(|task| match clock_minutes(&task.start_time) {
                Some(minutes) => Some((minutes, task)),
                None => {
                    tracing::warn!(
                        "⚠️ Dropping task '{}/{}' with unparsable start time '{}'",
                        task.kind,
                        task.category,
                        task.start_time
                    );
                    None
                }
            })
            .collect();
        keyed.sort_by_key(|(minutes, _)| *minutes);

        let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        let entries = keyed
            .into_iter()
            .map(|(start_minutes, task)| {
                let start = midnight + Duration::minutes(i64::from(start_minutes));
                let end = match clock_minutes(&task.end_time) {
                    Some(end_minutes) if end_minutes > start_minutes => {
                        midnight + Duration::minutes(i64::from(end_minutes))
                    }
                    _ => {
                        tracing::debug!(
                            "Task '{}/{}' has no usable end after {}, ends on start",
                            task.kind,
                            task.category,
                            task.start_time
                        );
                        start
                    }
                };
                ScheduledTask { task, start, end }
            })
            .collect();

        Self {
            date: Some(date),
            entries,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn head(&self) -> Option<&ScheduledTask> {
        self.entries.front()
    }

    pub fn head_mut(&mut self) -> Option<&mut ScheduledTask> {
        self.entries.front_mut()
    }

    pub fn pop_head(&mut self) -> Option<ScheduledTask> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledTask> {
        self.entries.iter()
    }
}
