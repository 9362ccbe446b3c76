//! # vtlife Company
//!
//! The company agent: reviews project proposals from its inbox, keeps a
//! persisted FIFO of approved projects and, once per virtual day, may turn
//! the oldest one into a shoot schedule for the performer.
//!
//! Collaborators are injected: the message store behind both mailboxes, the
//! review policy and the skip gate. Tests run the whole batch in memory.

pub mod gate;
pub mod project;
pub mod queue;
pub mod review;
pub mod window;
pub mod workflow;

pub use gate::{FixedSkip, RandomSkip, SkipDecider};
pub use project::ProjectInfo;
pub use queue::{ApprovedProject, ApprovedQueue, ApprovedStore};
pub use review::{LenientReview, ReviewDecision, ReviewPolicy, StrictReview, policy_for, review_project};
pub use window::{ShootWindow, WindowDefaults};
pub use workflow::{BatchReport, CompanyWorkflow, ScheduledShoot};
