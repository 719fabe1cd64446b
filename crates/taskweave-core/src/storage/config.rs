//! TOML-based application configuration.
//!
//! Holds every constant the flows agree on:
//! - Inbox list name and target-list prefix
//! - Scheduling horizon, work hours and default task duration
//! - The title sentinel and notes back-reference template
//! - Google calendar / tasks endpoints and the Gemini model
//!
//! Configuration is stored at `~/.config/taskweave/config.toml`. One
//! [`Config`] value is built at startup and handed to every component.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Task list naming rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListsConfig {
    #[serde(default = "default_inbox_name")]
    pub inbox_name: String,
    #[serde(default = "default_target_prefix")]
    pub target_prefix: String,
}

/// Scheduling window and durations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Days ahead covered by sync and scheduling.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    #[serde(default = "default_work_start_hour")]
    pub work_start_hour: u32,
    /// Exclusive; 24 means midnight.
    #[serde(default = "default_work_end_hour")]
    pub work_end_hour: u32,
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: u32,
}

/// Sentinel literals written into task titles and notes.
///
/// These must stay stable between runs; changing them makes previously
/// processed tasks look unprocessed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkersConfig {
    #[serde(default = "default_scheduled_prefix")]
    pub scheduled_prefix: String,
    /// Must contain `{event_id}`.
    #[serde(default = "default_event_ref_template")]
    pub event_ref_template: String,
}

/// Google Calendar settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    /// IANA zone attached to created events. When unset, events are sent
    /// with the local UTC offset.
    #[serde(default)]
    pub time_zone: Option<String>,
    /// Calendar color id for events created by the scheduler.
    #[serde(default)]
    pub color_id: Option<String>,
    #[serde(default = "default_calendar_api_base")]
    pub api_base: String,
}

/// Google Tasks settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    #[serde(default = "default_tasks_api_base")]
    pub api_base: String,
}

/// Gemini analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_analysis_api_base")]
    pub api_base: String,
    #[serde(default = "default_travel_minutes")]
    pub default_travel_minutes: u32,
}

/// HTTP client settings shared by all adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/taskweave/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub lists: ListsConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub markers: MarkersConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub tasks: TasksConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

// Default functions
fn default_inbox_name() -> String {
    "■メモ".into()
}
fn default_target_prefix() -> String {
    "■".into()
}
fn default_horizon_days() -> u32 {
    14
}
fn default_work_start_hour() -> u32 {
    9
}
fn default_work_end_hour() -> u32 {
    19
}
fn default_duration_minutes() -> u32 {
    30
}
fn default_scheduled_prefix() -> String {
    "【予定済】".into()
}
fn default_event_ref_template() -> String {
    "[Ref:EventID:{event_id}]".into()
}
fn default_calendar_id() -> String {
    "primary".into()
}
fn default_calendar_api_base() -> String {
    "https://www.googleapis.com/calendar/v3".into()
}
fn default_tasks_api_base() -> String {
    "https://tasks.googleapis.com/tasks/v1".into()
}
fn default_true() -> bool {
    true
}
fn default_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_analysis_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_travel_minutes() -> u32 {
    30
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for ListsConfig {
    fn default() -> Self {
        Self {
            inbox_name: default_inbox_name(),
            target_prefix: default_target_prefix(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            horizon_days: default_horizon_days(),
            work_start_hour: default_work_start_hour(),
            work_end_hour: default_work_end_hour(),
            default_duration_minutes: default_duration_minutes(),
        }
    }
}

impl Default for MarkersConfig {
    fn default() -> Self {
        Self {
            scheduled_prefix: default_scheduled_prefix(),
            event_ref_template: default_event_ref_template(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            time_zone: None,
            color_id: None,
            api_base: default_calendar_api_base(),
        }
    }
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            api_base: default_tasks_api_base(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_model(),
            api_base: default_analysis_api_base(),
            default_travel_minutes: default_travel_minutes(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
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
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("not a scalar key".to_string()));
                    }
                    // Optional strings are null until set.
                    serde_json::Value::Null if value.is_empty() => serde_json::Value::Null,
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Path of the config file inside `dir`.
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join("config.toml")
    }

    /// Load from `path`, writing defaults there when the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed or fails
    /// validation, or if the default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(err) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: err.to_string(),
            }),
        }
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };

        if self.lists.inbox_name.trim().is_empty() {
            return Err(invalid("lists.inbox_name", "must not be empty"));
        }
        if self.lists.target_prefix.is_empty() {
            return Err(invalid("lists.target_prefix", "must not be empty"));
        }
        if self.schedule.horizon_days == 0 {
            return Err(invalid("schedule.horizon_days", "must be at least 1"));
        }
        if self.schedule.work_end_hour > 24 {
            return Err(invalid("schedule.work_end_hour", "must be at most 24"));
        }
        if self.schedule.work_start_hour >= self.schedule.work_end_hour {
            return Err(invalid(
                "schedule.work_start_hour",
                "must be earlier than schedule.work_end_hour",
            ));
        }
        if self.schedule.default_duration_minutes == 0 {
            return Err(invalid(
                "schedule.default_duration_minutes",
                "must be positive",
            ));
        }
        if self.markers.scheduled_prefix.is_empty() {
            return Err(invalid("markers.scheduled_prefix", "must not be empty"));
        }
        if !self.markers.event_ref_template.contains("{event_id}") {
            return Err(invalid(
                "markers.event_ref_template",
                "must contain the {event_id} placeholder",
            ));
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => Some(String::new()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key, validating the result. The caller saves.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting configuration is invalid. `self` is left untouched
    /// on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
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
}
