//! Message store port: the backend a mailbox writes to and drains from.

use std::fmt;

use vtlife_core::Result;

use crate::mail::Mail;

/// Identity of a stored message (the file name for the filesystem store).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parsed message and the id needed to acknowledge it.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub id: MessageId,
    pub mail: Mail,
}

/// One entry found while listing a store.
#[derive(Debug, Clone)]
pub enum Fetched {
    Mail(Envelope),
    /// Present but unparsable; still acknowledgeable.
    Malformed { id: MessageId, reason: String },
}

/// Durable message storage for one inbox.
pub trait MessageStore: Send {
    /// Store a new message under a fresh, never-reused id.
    fn put(&self, mail: &Mail) -> Result<MessageId>;

    /// Everything currently present. Entries that disappear while listing
    /// are skipped; order carries no meaning.
    fn list(&self) -> Result<Vec<Fetched>>;

    /// Delete a message. Removing an id that is already gone is not an error.
    fn remove(&self, id: &MessageId) -> Result<()>;
}
