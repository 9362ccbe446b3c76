//! In-memory message store for tests. Not durable.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use vtlife_core::{Result, VtlifeError};

use crate::mail::Mail;
use crate::store::{Envelope, Fetched, MessageId, MessageStore};

/// Raw JSON text keyed by id, so tests can plant malformed entries.
#[derive(Default)]
pub struct MemoryMessageStore {
    inner: Mutex<BTreeMap<String, String>>,
    seq: AtomicU64,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert raw text under an explicit id.
    pub fn insert_raw(&self, id: &str, raw: &str) {
        self.lock().insert(id.to_string(), raw.to_string());
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Parsed copies of every well-formed message, in id order.
    pub fn mails(&self) -> Vec<Mail> {
        self.lock()
            .values()
            .filter_map(|raw| serde_json::from_str(raw).ok())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MessageStore for MemoryMessageStore {
    fn put(&self, mail: &Mail) -> Result<MessageId> {
        let raw = serde_json::to_string(mail)?;
        let mut inner = self.lock();
        loop {
            let seq = self.seq.fetch_add(1, Ordering::Relaxed);
            let id = format!("mail_{seq:06}.json");
            if !inner.contains_key(&id) {
                inner.insert(id.clone(), raw);
                return Ok(MessageId(id));
            }
            if seq == u64::MAX {
                return Err(VtlifeError::Mailbox("message ids exhausted".into()));
            }
        }
    }

    fn list(&self) -> Result<Vec<Fetched>> {
        Ok(self
            .lock()
            .iter()
            .map(|(id, raw)| match serde_json::from_str::<Mail>(raw) {
                Ok(mail) => Fetched::Mail(Envelope {
                    id: MessageId(id.clone()),
                    mail,
                }),
                Err(e) => Fetched::Malformed {
                    id: MessageId(id.clone()),
                    reason: e.to_string(),
                },
            })
            .collect())
    }

    fn remove(&self, id: &MessageId) -> Result<()> {
        self.lock().remove(&id.0);
        Ok(())
    }
}
