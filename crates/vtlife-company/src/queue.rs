//! Approved-project queue: FIFO by insertion, keyed by project id.
//!
//! On disk the queue is a single JSON object `{ "<project_id>": <mail>, ... }`
//! whose key order is the queue order. Serialization walks the deque, so the
//! order survives a save/load cycle without depending on map iteration.

use std::collections::VecDeque;
use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use vtlife_core::{JsonFile, Result};

use crate::project::ProjectInfo;

/// A reviewed-and-approved proposal awaiting a shoot.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovedProject {
    pub id: String,
    /// The approved mail payload as received.
    pub payload: Value,
}

impl ApprovedProject {
    pub fn info(&self) -> ProjectInfo {
        ProjectInfo::from_mail(&self.payload)
    }
}

/// Oldest entry first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApprovedQueue {
    entries: VecDeque<ApprovedProject>,
}

impl ApprovedQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a project. Re-approving a queued id replaces its payload and
    /// keeps its position.
    pub fn insert(&mut self, id: &str, payload: Value) {
        match self.entries.iter_mut().find(|p| p.id == id) {
            Some(existing) => existing.payload = payload,
            None => self.entries.push_back(ApprovedProject {
                id: id.to_string(),
                payload,
            }),
        }
    }

    /// Next candidate for scheduling.
    pub fn front(&self) -> Option<&ApprovedProject> {
        self.entries.front()
    }

    pub fn get(&self, id: &str) -> Option<&ApprovedProject> {
        self.entries.iter().find(|p| p.id == id)
    }

    pub fn remove_by_id(&mut self, id: &str) -> Option<ApprovedProject> {
        let pos = self.entries.iter().position(|p| p.id == id)?;
        self.entries.remove(pos)
    }

    /// Remove the first project whose resolved name matches.
    pub fn remove_by_name(&mut self, name: &str) -> Option<ApprovedProject> {
        let pos = self.entries.iter().position(|p| p.info().name == name)?;
        self.entries.remove(pos)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApprovedProject> {
        self.entries.iter()
    }
}

impl Serialize for ApprovedQueue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for project in &self.entries {
            map.serialize_entry(&project.id, &project.payload)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ApprovedQueue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct QueueVisitor;

        impl<'de> Visitor<'de> for QueueVisitor {
            type Value = ApprovedQueue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of project id to approved payload")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<ApprovedQueue, A::Error> {
                let mut queue = ApprovedQueue::new();
                while let Some((id, payload)) = access.next_entry::<String, Value>()? {
                    queue.insert(&id, payload);
                }
                Ok(queue)
            }
        }

        deserializer.deserialize_map(QueueVisitor)
    }
}

/// File-backed persistence for the queue. Every save rewrites the whole file.
pub struct ApprovedStore {
    file: JsonFile,
}

impl ApprovedStore {
    pub fn new(path: &Path) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Load the queue; a missing or corrupt file yields an empty queue.
    pub fn load(&self) -> ApprovedQueue {
        match self.file.load::<ApprovedQueue>() {
            Ok(Some(queue)) => {
                tracing::info!("📂 Loaded {} approved projects", queue.len());
                queue
            }
            Ok(None) => ApprovedQueue::new(),
            Err(e) => {
                tracing::warn!("⚠️ Approved project store unreadable ({e}), starting empty");
                ApprovedQueue::new()
            }
        }
    }

    pub fn save(&self, queue: &ApprovedQueue) -> Result<()> {
        self.file.save(queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn queue_of(ids: &[&str]) -> ApprovedQueue {
        let mut queue = ApprovedQueue::new();
        for id in ids {
            queue.insert(id, json!({"project": {"project_name": format!("name-{id}")}}));
        }
        queue
    }

    #[test]
    fn test_front_is_oldest_insert() {
        let queue = queue_of(&["z", "a", "m"]);
        assert_eq!(queue.front().unwrap().id, "z");
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut queue = queue_of(&["a", "b"]);
        queue.insert("a", json!({"v": 2}));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.front().unwrap().payload, json!({"v": 2}));
    }

    #[test]
    fn test_remove_by_id_and_name() {
        let mut queue = queue_of(&["a", "b", "c"]);
        assert_eq!(queue.remove_by_id("b").unwrap().id, "b");
        assert!(queue.remove_by_id("b").is_none());
        assert_eq!(queue.remove_by_name("name-c").unwrap().id, "c");
        assert!(queue.remove_by_name("nobody").is_none());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_persist_reload_preserves_order_and_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = ApprovedStore::new(&dir.path().join("approved_projects.json"));
        let mut queue = queue_of(&["zeta", "alpha", "mid"]);
        queue.insert("nested", json!({"a": [1, 2, {"b": null}], "c": "文字"}));
        store.save(&queue).unwrap();

        let reloaded = store.load();
        assert_eq!(reloaded, queue);
        let ids: Vec<_> = reloaded.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid", "nested"]);
    }

    #[test]
    fn test_corrupt_store_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("approved_projects.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(ApprovedStore::new(&path).load().is_empty());
    }

    #[test]
    fn test_missing_store_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ApprovedStore::new(&dir.path().join("none.json")).load().is_empty());
    }
}
