//! # vtlife Bridge
//!
//! Pushes what the performer is doing to an attached presentation client:
//! clock updates, background lighting changes and task boundaries.
//! Delivery is fire-and-forget; the simulation never waits on a client.

pub mod events;
pub mod server;

pub use events::{BackgroundMode, BackgroundTracker, PresentationEvent, TaskAction};
pub use server::Bridge;
