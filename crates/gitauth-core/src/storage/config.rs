//! TOML-based application configuration.
//!
//! Stores the defaults used when a flag is not given on the command line:
//! - Daily clock window and timezone
//! - Weekend skipping and the default calendar span
//! - Missing-weight and tie-break policies, preview size
//!
//! Configuration is stored at `~/.config/gitauth/config.toml`.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::allocator::TieBreak;
use crate::error::ConfigError;
use crate::schedule::ScheduleOptions;
use crate::timezone::TimeZoneSpec;
use crate::weight::MissingWeightPolicy;
use crate::window::ClockTime;

/// Window defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_start_time")]
    pub start_time: String,
    #[serde(default = "default_end_time")]
    pub end_time: String,
    /// Zone name; empty means local.
    #[serde(default)]
    pub timezone: String,
    #[serde(default = "default_true")]
    pub skip_weekends: bool,
    /// Days back from today used when no start date is given.
    #[serde(default = "default_span_days")]
    pub default_span_days: u32,
}

/// Arrange command defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrangeConfig {
    #[serde(default)]
    pub missing_weight: MissingWeightPolicy,
    #[serde(default)]
    pub tie_break: TieBreak,
    #[serde(default = "default_preview_count")]
    pub preview_count: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/gitauth/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub arrange: ArrangeConfig,
}

// Default functions
fn default_start_time() -> String {
    "09:00".into()
}
fn default_end_time() -> String {
    "17:00".into()
}
fn default_true() -> bool {
    true
}
fn default_span_days() -> u32 {
    30
}
fn default_preview_count() -> u32 {
    5
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start_time: default_start_time(),
            end_time: default_end_time(),
            timezone: String::new(),
            skip_weekends: true,
            default_span_days: default_span_days(),
        }
    }
}

impl Default for ArrangeConfig {
    fn default() -> Self {
        Self {
            missing_weight: MissingWeightPolicy::default(),
            tie_break: TieBreak::default(),
            preview_count: default_preview_count(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("config.toml"),
                message: e.to_string(),
            })
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
        }
    }

    /// Parse and validate TOML content.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Check that the stored clock times form a valid window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let start = self.daily_start()?;
        let end = self.daily_end()?;
        if end <= start {
            return Err(ConfigError::InvalidValue {
                key: "window.end_time".into(),
                message: format!("must be after window.start_time ({start})"),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// or fails validation, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Set a config value by key in memory only.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn daily_start(&self) -> Result<ClockTime, ConfigError> {
        ClockTime::parse(&self.window.start_time).map_err(|e| ConfigError::InvalidValue {
            key: "window.start_time".into(),
            message: e.to_string(),
        })
    }

    pub fn daily_end(&self) -> Result<ClockTime, ConfigError> {
        ClockTime::parse(&self.window.end_time).map_err(|e| ConfigError::InvalidValue {
            key: "window.end_time".into(),
            message: e.to_string(),
        })
    }

    pub fn timezone(&self) -> TimeZoneSpec {
        TimeZoneSpec::parse(&self.window.timezone)
    }

    /// `(today - default_span_days, today)`.
    pub fn default_date_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = today
            .checked_sub_signed(Duration::days(i64::from(self.window.default_span_days)))
            .unwrap_or(NaiveDate::MIN);
        (start, today)
    }

    pub fn schedule_options(&self) -> ScheduleOptions {
        ScheduleOptions {
            missing_weight: self.arrange.missing_weight,
            tie_break: self.arrange.tie_break,
        }
    }
}
