//! # vtlife Core
//!
//! Shared building blocks for every vtlife crate:
//! - `config`: TOML configuration with per-field defaults
//! - `error`: the workspace error type
//! - `store`: whole-file JSON records with atomic replace
//! - `timefmt`: "HH:MM" and date-time parsing used by plans and mail payloads

pub mod config;
pub mod error;
pub mod store;
pub mod timefmt;

pub use config::VtlifeConfig;
pub use error::{Result, VtlifeError};
pub use store::JsonFile;
