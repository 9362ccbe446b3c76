//! File-based JSON state for small records, saved as pretty JSON.
//! Writes go to a sibling temp file first and are renamed into place, so a
//! crash mid-write never leaves a truncated record behind.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use crate::error::{Result, VtlifeError};

/// A single JSON record on disk.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record. `Ok(None)` when the file does not exist yet;
    /// `Err` when it exists but cannot be read or parsed.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = serde_json::from_str(&json)
            .map_err(|e| VtlifeError::Store(format!("{}: {e}", self.path.display())))?;
        Ok(Some(value))
    }

    /// Replace the whole record on disk.
    pub fn save<T: Serialize>(&self, value: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(value)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!("💾 Saved {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
        count: u32,
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("nope.json"));
        assert!(file.load::<Record>().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("a").join("record.json"));
        let record = Record { name: "x".into(), count: 3 };
        file.save(&record).unwrap();
        assert_eq!(file.load::<Record>().unwrap(), Some(record));
        assert!(!dir.path().join("a").join("record.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");
        std::fs::write(&path, "{ not json").unwrap();
        let file = JsonFile::new(path);
        assert!(matches!(file.load::<Record>(), Err(VtlifeError::Store(_))));
    }
}
