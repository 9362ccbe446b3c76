//! # vtlife Mailbox
//!
//! Directional, durable, file-per-message queues between two agents.
//!
//! ## Delivery contract
//! ```text
//! sender   ── send() ──▶  <inbox>/mail_<timestamp>_<pid>_<seq>.json
//! reader   ── drain() ─▶  unordered batch of everything present now
//!          ── handle each message
//!          ── ack(id) ─▶  file deleted (exactly once, after handling)
//! ```
//! A crash between handling and `ack` means the message is seen again on
//! the next drain, so handlers should be idempotent where they can be.
//!
//! Workflow code talks to [`MailboxChannel`], which is generic over a
//! [`MessageStore`]; the filesystem is one backend, memory is another.

pub mod channel;
pub mod fs;
pub mod mail;
pub mod memory;
pub mod store;

pub use channel::{Drained, MailboxChannel, MailboxRole};
pub use fs::FsMessageStore;
pub use mail::{Mail, MailType};
pub use memory::MemoryMessageStore;
pub use store::{Envelope, Fetched, MessageId, MessageStore};
