//! Mailbox channel: send into, drain from and acknowledge one inbox.

use std::fmt;
use std::path::Path;

use serde_json::Value;
use vtlife_core::Result;

use crate::fs::FsMessageStore;
use crate::mail::{Mail, MailType};
use crate::store::{Envelope, Fetched, MessageId, MessageStore};

/// Which agent owns the inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxRole {
    Company,
    Performer,
}

impl fmt::Display for MailboxRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailboxRole::Company => f.write_str("company"),
            MailboxRole::Performer => f.write_str("performer"),
        }
    }
}

/// One drain: parsed messages plus ids of entries that could not be parsed.
#[derive(Debug, Default)]
pub struct Drained {
    pub messages: Vec<Envelope>,
    pub malformed: Vec<MessageId>,
}

impl Drained {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.malformed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len() + self.malformed.len()
    }
}

/// A directional inbox over any [`MessageStore`].
pub struct MailboxChannel<S: MessageStore> {
    role: MailboxRole,
    store: S,
}

impl MailboxChannel<FsMessageStore> {
    /// Filesystem inbox rooted at `dir`.
    pub fn open(dir: &Path, role: MailboxRole) -> Result<Self> {
        Ok(Self::new(role, FsMessageStore::open(dir)?))
    }
}

impl<S: MessageStore> MailboxChannel<S> {
    pub fn new(role: MailboxRole, store: S) -> Self {
        Self { role, store }
    }

    pub fn role(&self) -> MailboxRole {
        self.role
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Write a new message stamped with the current local time.
    pub fn send(&self, subject: &str, kind: MailType, payload: Value) -> Result<MessageId> {
        let at = chrono::Local::now().naive_local();
        self.send_at(subject, kind, payload, at)
    }

    /// Write a new message with an explicit timestamp.
    pub fn send_at(
        &self,
        subject: &str,
        kind: MailType,
        payload: Value,
        at: chrono::NaiveDateTime,
    ) -> Result<MessageId> {
        let mail = Mail::new(subject, kind, payload, at);
        let id = self.store.put(&mail)?;
        tracing::info!("📤 [{}] {} '{}' ({id})", self.role, mail.kind, mail.subject);
        Ok(id)
    }

    /// Everything currently in the inbox. Nothing is removed.
    pub fn drain(&self) -> Result<Drained> {
        let mut drained = Drained::default();
        for entry in self.store.list()? {
            match entry {
                Fetched::Mail(envelope) => drained.messages.push(envelope),
                Fetched::Malformed { id, reason } => {
                    tracing::warn!("⚠️ [{}] Malformed message {id}: {reason}", self.role);
                    drained.malformed.push(id);
                }
            }
        }
        if !drained.is_empty() {
            tracing::debug!("📥 [{}] Drained {} messages", self.role, drained.len());
        }
        Ok(drained)
    }

    /// Delete a handled message.
    pub fn ack(&self, id: &MessageId) -> Result<()> {
        self.store.remove(id)
    }
}
