//! # vtlife Scheduler
//!
//! Virtual-time daily scheduling for one simulated agent.
//!
//! ## Architecture
//! ```text
//! VirtualClock.tick()            (real elapsed × ratio → simulated minutes)
//!   └── DailyScheduler.tick(now)
//!         ├── DayCycle: hour == start_hour → STARTED, hour == end_hour → NOT_STARTED
//!         ├── on day start → Planner.plan(date) → DailySchedule::normalize
//!         └── every tick → head task only
//!               ├── now ≥ start → Executor.classify(task, now, true)
//!               └── now ≥ end   → Executor.classify(task, now, false), pop
//! ```
//!
//! Collaborators (planner, executor) are traits so the engine can be driven
//! with deterministic fakes in tests.

pub mod clock;
pub mod cycle;
pub mod engine;
pub mod executor;
pub mod planner;
pub mod tasks;

pub use clock::{ClockState, VirtualClock};
pub use cycle::{DayCycle, DayEdge};
pub use engine::{DailyScheduler, TickReport};
pub use executor::Executor;
pub use planner::{Planner, TodoListPlanner};
pub use tasks::{DailySchedule, ScheduledTask, Task};
