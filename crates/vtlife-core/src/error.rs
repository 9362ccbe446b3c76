//! Error type shared by all vtlife crates.

use thiserror::Error;

/// Errors surfaced by vtlife library code.
///
/// Conditions the system treats as recoverable (corrupt state files,
/// malformed mail, bad time strings) are handled at the call site and
/// never reach this type.
#[derive(Debug, Error)]
pub enum VtlifeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Mailbox error: {0}")]
    Mailbox(String),

    #[error("Planner error: {0}")]
    Planner(String),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, VtlifeError>;
