//! vtlife configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, VtlifeError};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VtlifeConfig {
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub mailbox: MailboxConfig,
    #[serde(default)]
    pub company: CompanyConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl VtlifeConfig {
    /// Load config from the default path (~/.vtlife/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| VtlifeError::Config(format!("Failed to read {}: {e}", path.display())))?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| VtlifeError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the vtlife home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".vtlife")
    }

    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<()> {
        let ratio = self.clock.ratio;
        if !ratio.is_finite() || ratio < 0.0 {
            return Err(VtlifeError::Config(format!(
                "clock.ratio must be a finite, non-negative number (got {ratio})"
            )));
        }
        for (name, hour) in [
            ("schedule.start_hour", self.schedule.start_hour),
            ("schedule.end_hour", self.schedule.end_hour),
            ("company.default_shoot_hour", self.company.default_shoot_hour),
        ] {
            if hour >= 24 {
                return Err(VtlifeError::Config(format!("{name} must be < 24 (got {hour})")));
            }
        }
        if let Some(hour) = self.company.batch_hour.filter(|h| *h >= 24) {
            return Err(VtlifeError::Config(format!("company.batch_hour must be < 24 (got {hour})")));
        }
        if self.schedule.start_hour == self.schedule.end_hour {
            return Err(VtlifeError::Config(
                "schedule.start_hour and schedule.end_hour must differ".into(),
            ));
        }
        if self.batch_hour() == self.schedule.end_hour {
            return Err(VtlifeError::Config(
                "company batch hour must differ from schedule.end_hour".into(),
            ));
        }
        let p = self.company.skip_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(VtlifeError::Config(format!(
                "company.skip_probability must be within [0, 1] (got {p})"
            )));
        }
        if self.company.shoot_duration_hours == 0 {
            return Err(VtlifeError::Config("company.shoot_duration_hours must be > 0".into()));
        }
        if self.runtime.tick_interval_ms == 0 {
            return Err(VtlifeError::Config("runtime.tick_interval_ms must be > 0".into()));
        }
        Ok(())
    }

    /// The hour at which the company agent runs its daily batch.
    pub fn batch_hour(&self) -> u32 {
        self.company.batch_hour.unwrap_or(self.schedule.start_hour)
    }
}

/// Expand a leading `~` in a configured path.
pub fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}

/// Virtual clock configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Simulated minutes per real second.
    #[serde(default = "default_ratio")]
    pub ratio: f64,
    #[serde(default = "default_clock_state")]
    pub state_file: String,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            ratio: default_ratio(),
            state_file: default_clock_state(),
        }
    }
}

/// Daily scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,
    #[serde(default = "default_end_hour")]
    pub end_hour: u32,
    /// Directory holding one `<YYYY-MM-DD>.json` plan per virtual day.
    #[serde(default = "default_todolist_dir")]
    pub todolist_dir: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            start_hour: default_start_hour(),
            end_hour: default_end_hour(),
            todolist_dir: default_todolist_dir(),
        }
    }
}

/// Mailbox directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailboxConfig {
    #[serde(default = "default_mailbox_root")]
    pub root: String,
    #[serde(default = "default_company_dir")]
    pub company_dir: String,
    #[serde(default = "default_performer_dir")]
    pub performer_dir: String,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            root: default_mailbox_root(),
            company_dir: default_company_dir(),
            performer_dir: default_performer_dir(),
        }
    }
}

impl MailboxConfig {
    pub fn company_inbox(&self) -> PathBuf {
        expand_path(&self.root).join(&self.company_dir)
    }

    pub fn performer_inbox(&self) -> PathBuf {
        expand_path(&self.root).join(&self.performer_dir)
    }
}

/// Review strictness for inbound project proposals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewMode {
    /// Policy "A".
    #[default]
    Lenient,
    /// Policy "B".
    Strict,
}

/// Company agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyConfig {
    #[serde(default = "default_approved_store")]
    pub approved_store: String,
    #[serde(default = "default_company_clock_state")]
    pub clock_state_file: String,
    #[serde(default)]
    pub review_mode: ReviewMode,
    /// Chance that a batch skips scheduling a shoot.
    #[serde(default = "default_skip_probability")]
    pub skip_probability: f64,
    #[serde(default = "default_shoot_hour")]
    pub default_shoot_hour: u32,
    #[serde(default = "default_shoot_duration_hours")]
    pub shoot_duration_hours: u32,
    /// Virtual hour of the daily batch; falls back to `schedule.start_hour`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_hour: Option<u32>,
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            approved_store: default_approved_store(),
            clock_state_file: default_company_clock_state(),
            review_mode: ReviewMode::default(),
            skip_probability: default_skip_probability(),
            default_shoot_hour: default_shoot_hour(),
            shoot_duration_hours: default_shoot_duration_hours(),
            batch_hour: None,
        }
    }
}

/// Weather used to pick background modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    #[default]
    Sunshine,
    Rain,
}

/// Presentation bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_bridge_host")]
    pub host: String,
    #[serde(default = "default_bridge_port")]
    pub port: u16,
    #[serde(default)]
    pub weather: Weather,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_bridge_host(),
            port: default_bridge_port(),
            weather: Weather::default(),
        }
    }
}

/// Agent loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Persist the clock every N ticks (0 = only on shutdown).
    #[serde(default = "default_persist_every_ticks")]
    pub persist_every_ticks: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            persist_every_ticks: default_persist_every_ticks(),
        }
    }
}

fn data_path(rel: &str) -> String {
    format!("~/.vtlife/data/{rel}")
}

fn default_ratio() -> f64 { 5.0 }
fn default_clock_state() -> String { data_path("game_time.json") }
fn default_start_hour() -> u32 { 8 }
fn default_end_hour() -> u32 { 3 }
fn default_todolist_dir() -> String { data_path("TodoList") }
fn default_mailbox_root() -> String { data_path("mail") }
fn default_company_dir() -> String { "Company_MailBox".into() }
fn default_performer_dir() -> String { "Personal_MailBox".into() }
fn default_approved_store() -> String { data_path("approved_projects.json") }
fn default_company_clock_state() -> String { data_path("company_time.json") }
fn default_skip_probability() -> f64 { 0.5 }
fn default_shoot_hour() -> u32 { 10 }
fn default_shoot_duration_hours() -> u32 { 2 }
fn default_bridge_host() -> String { "127.0.0.1".into() }
fn default_bridge_port() -> u16 { 50007 }
fn default_tick_interval_ms() -> u64 { 1000 }
fn default_persist_every_ticks() -> u64 { 60 }
fn bool_true() -> bool { true }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VtlifeConfig::default();
        assert_eq!(config.clock.ratio, 5.0);
        assert_eq!(config.schedule.start_hour, 8);
        assert_eq!(config.schedule.end_hour, 3);
        assert_eq!(config.company.skip_probability, 0.5);
        assert_eq!(config.company.review_mode, ReviewMode::Lenient);
        assert_eq!(config.batch_hour(), 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: VtlifeConfig = toml::from_str(
            r#"
            [clock]
            ratio = 20.0

            [company]
            review_mode = "strict"
            batch_hour = 9
            "#,
        )
        .unwrap();
        assert_eq!(config.clock.ratio, 20.0);
        assert_eq!(config.company.review_mode, ReviewMode::Strict);
        assert_eq!(config.batch_hour(), 9);
        assert_eq!(config.bridge.port, 50007);
        assert_eq!(config.runtime.tick_interval_ms, 1000);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = VtlifeConfig::default();
        config.clock.ratio = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = VtlifeConfig::default();
        config.schedule.start_hour = 24;
        assert!(config.validate().is_err());

        let mut config = VtlifeConfig::default();
        config.company.skip_probability = 1.5;
        assert!(config.validate().is_err());

        let mut config = VtlifeConfig::default();
        config.schedule.end_hour = config.schedule.start_hour;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = VtlifeConfig::default();
        config.bridge.weather = Weather::Rain;
        config.save_to(&path).unwrap();

        let loaded = VtlifeConfig::load_from(&path).unwrap();
        assert_eq!(loaded.bridge.weather, Weather::Rain);
        assert_eq!(loaded.mailbox.company_dir, "Company_MailBox");
    }

    #[test]
    fn test_mailbox_paths() {
        let config = MailboxConfig {
            root: "/tmp/vt".into(),
            ..MailboxConfig::default()
        };
        assert_eq!(config.company_inbox(), PathBuf::from("/tmp/vt/Company_MailBox"));
        assert_eq!(config.performer_inbox(), PathBuf::from("/tmp/vt/Personal_MailBox"));
    }
}
