//! Daily scheduler engine: observes day boundaries and dispatches the
//! head of the schedule tick by tick.

use chrono::{NaiveDateTime, Timelike};

use crate::cycle::{DayCycle, DayEdge};
use crate::executor::Executor;
use crate::planner::Planner;
use crate::tasks::DailySchedule;

/// What a single tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub edge: Option<DayEdge>,
    pub started: bool,
    pub ended: bool,
}

/// One active plan per agent, executed strictly in order.
pub struct DailyScheduler {
    cycle: DayCycle,
    planner: Box<dyn Planner>,
    schedule: DailySchedule,
}

impl DailyScheduler {
    pub fn new(cycle: DayCycle, planner: Box<dyn Planner>) -> Self {
        Self {
            cycle,
            planner,
            schedule: DailySchedule::default(),
        }
    }

    pub fn schedule(&self) -> &DailySchedule {
        &self.schedule
    }

    pub fn is_day_started(&self) -> bool {
        self.cycle.is_started()
    }

    /// Advance the scheduler to virtual time `now`.
    pub fn tick(&mut self, now: NaiveDateTime, executor: &mut dyn Executor) -> TickReport {
        let mut report = TickReport {
            edge: self.cycle.observe(now.hour()),
            ..TickReport::default()
        };

        match report.edge {
            Some(DayEdge::Start) => self.start_day(now),
            Some(DayEdge::End) => {
                tracing::info!("🌙 Day ended at {} ({} tasks left)", now, self.schedule.len());
            }
            None => {}
        }

        let Some(head) = self.schedule.head_mut() else {
            return report;
        };

        if !head.task.started && now >= head.start {
            tracing::info!(
                "▶️ Task start: {}/{} ({}–{})",
                head.task.kind,
                head.task.category,
                head.task.start_time,
                head.task.end_time
            );
            executor.classify(&head.task, now, true);
            head.task.started = true;
            report.started = true;
        }

        if head.task.started && now >= head.end {
            tracing::info!("⏹️ Task end: {}/{}", head.task.kind, head.task.category);
            executor.classify(&head.task, now, false);
            self.schedule.pop_head();
            report.ended = true;
        }

        report
    }

    fn start_day(&mut self, now: NaiveDateTime) {
        let date = now.date();
        tracing::info!("☀️ New day started: {date}");
        if !self.schedule.is_empty() {
            tracing::warn!(
                "⚠️ Discarding {} unfinished tasks from {:?}",
                self.schedule.len(),
                self.schedule.date()
            );
        }
        let tasks = match self.planner.plan(date) {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::warn!("⚠️ Planner failed for {date}: {e}; running with an empty schedule");
                Vec::new()
            }
        };
        self.schedule = DailySchedule::normalize(date, tasks);
        tracing::info!("📅 Today has {} tasks", self.schedule.len());
    }
}
