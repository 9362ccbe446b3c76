//! Executor boundary: where dispatched task boundaries leave the core.

use chrono::NaiveDateTime;

use crate::tasks::Task;

/// Receives task start/end events in schedule order.
pub trait Executor {
    fn classify(&mut self, task: &Task, now: NaiveDateTime, is_start: bool);
}

impl<F> Executor for F
where
    F: FnMut(&Task, NaiveDateTime, bool),
{
    fn classify(&mut self, task: &Task, now: NaiveDateTime, is_start: bool) {
        self(task, now, is_start)
    }
}
