//! Mail records: one JSON object per file.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vtlife_core::timefmt::MINUTE_FORMAT;

/// Message discriminator, stored as the `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MailType {
    Project,
    Advertisement,
    ProjectReview,
    ShootSchedule,
    Other(String),
}

impl MailType {
    pub fn as_str(&self) -> &str {
        match self {
            MailType::Project => "project",
            MailType::Advertisement => "advertisement",
            MailType::ProjectReview => "project_review",
            MailType::ShootSchedule => "shoot_schedule",
            MailType::Other(s) => s,
        }
    }
}

impl From<String> for MailType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "project" => MailType::Project,
            "advertisement" => MailType::Advertisement,
            "project_review" => MailType::ProjectReview,
            "shoot_schedule" => MailType::ShootSchedule,
            _ => MailType::Other(s),
        }
    }
}

impl From<MailType> for String {
    fn from(t: MailType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for MailType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message. Type-specific fields live flat in `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mail {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub subject: String,
    #[serde(rename = "type")]
    pub kind: MailType,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

const RESERVED_KEYS: [&str; 3] = ["timestamp", "subject", "type"];

impl Mail {
    /// Build a mail stamped at `at`. A non-object payload is stored under
    /// `content`; keys that clash with the envelope fields are dropped.
    pub fn new(subject: &str, kind: MailType, payload: Value, at: NaiveDateTime) -> Self {
        let mut payload = match payload {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("content".into(), other);
                map
            }
        };
        for key in RESERVED_KEYS {
            payload.remove(key);
        }
        Self {
            timestamp: at.format(MINUTE_FORMAT).to_string(),
            subject: subject.to_string(),
            kind,
            payload,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Payload as a JSON object value.
    pub fn payload_value(&self) -> Value {
        Value::Object(self.payload.clone())
    }
}
