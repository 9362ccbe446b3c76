//! Edge-triggered day boundaries.
//!
//! `NOT_STARTED --(hour == start)--> STARTED --(hour == end)--> NOT_STARTED`
//!
//! The hour condition stays true for many ticks; each transition fires once.

/// A boundary crossed on this observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayEdge {
    Start,
    End,
}

/// Day state machine for one agent.
#[derive(Debug, Clone)]
pub struct DayCycle {
    start_hour: u32,
    end_hour: u32,
    started: bool,
}

impl DayCycle {
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour,
            end_hour,
            started: false,
        }
    }

    /// Feed the current virtual hour; returns the edge crossed, if any.
    pub fn observe(&mut self, hour: u32) -> Option<DayEdge> {
        if !self.started && hour == self.start_hour {
            self.started = true;
            Some(DayEdge::Start)
        } else if self.started && hour == self.end_hour {
            self.started = false;
            Some(DayEdge::End)
        } else {
            None
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}
