//! Filesystem message store: one JSON file per message in an inbox directory.
//!
//! Names are `mail_<YYYYMMDD_HHMMSS_micros>_<pid>_<seq>.json`, so they sort
//! with send order for a single sender and never collide between senders.
//! Content is written to a `.tmp` sibling and hard-linked into place. The
//! link fails instead of replacing an existing message, and readers only
//! look at `.json` names, so they never see a half-written file.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use vtlife_core::{Result, VtlifeError};

use crate::mail::Mail;
use crate::store::{Envelope, Fetched, MessageId, MessageStore};

const MAX_NAME_ATTEMPTS: u32 = 64;

pub struct FsMessageStore {
    dir: PathBuf,
    seq: AtomicU64,
}

impl FsMessageStore {
    /// Open (and create if needed) an inbox directory.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            seq: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn next_name(&self) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!(
            "mail_{}_{}_{seq:06}.json",
            chrono::Local::now().format("%Y%m%d_%H%M%S_%6f"),
            std::process::id()
        )
    }

    /// Write `json` under `name` unless that name exists. `Ok(false)` means taken.
    fn publish(&self, name: &str, json: &str) -> Result<bool> {
        let target = self.dir.join(name);
        let tmp = self.dir.join(format!("{name}.tmp"));
        std::fs::write(&tmp, json)?;
        let linked = std::fs::hard_link(&tmp, &target);
        if let Err(e) = std::fs::remove_file(&tmp) {
            tracing::debug!("Could not remove {}: {e}", tmp.display());
        }
        match linked {
            Ok(()) => {
                tracing::debug!("📨 Wrote {}", target.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl MessageStore for FsMessageStore {
    fn put(&self, mail: &Mail) -> Result<MessageId> {
        let json = serde_json::to_string_pretty(mail)?;
        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = self.next_name();
            if self.publish(&name, &json)? {
                return Ok(MessageId(name));
            }
            tracing::debug!("Message name {name} taken, trying the next one");
        }
        Err(VtlifeError::Mailbox(format!(
            "no free message name in {} after {MAX_NAME_ATTEMPTS} attempts",
            self.dir.display()
        )))
    }

    fn list(&self) -> Result<Vec<Fetched>> {
        let mut names: Vec<String> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(".json"))
            .collect();
        names.sort();

        let mut fetched = Vec::with_capacity(names.len());
        for name in names {
            let path = self.dir.join(&name);
            let raw = match std::fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!("Message {name} vanished while draining");
                    continue;
                }
                Err(e) => {
                    tracing::warn!("⚠️ Skipping unreadable message {}: {e}", path.display());
                    continue;
                }
            };
            let id = MessageId(name);
            match serde_json::from_str::<Mail>(&raw) {
                Ok(mail) => fetched.push(Fetched::Mail(Envelope { id, mail })),
                Err(e) => fetched.push(Fetched::Malformed {
                    id,
                    reason: e.to_string(),
                }),
            }
        }
        Ok(fetched)
    }

    fn remove(&self, id: &MessageId) -> Result<()> {
        match std::fs::remove_file(self.dir.join(&id.0)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Message {id} already removed");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
