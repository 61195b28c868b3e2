//! TOML-based application configuration.
//!
//! Stores:
//! - Daily prompt and weekly report times, plus the reference UTC offset
//! - Check-in window length, prompt text and the accepted signal
//! - Report title and fallback text
//! - Channel seeds for a fresh attendance document
//!
//! Configuration is stored at `~/.config/rollcall/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::channels::ChannelBindings;
use crate::error::ConfigError;
use crate::model::ChannelId;
use crate::schedule::{DailyTrigger, WeeklyTrigger};
use crate::service::ServiceSettings;

const ATTENDANCE_CHANNEL_ENV: &str = "ROLLCALL_ATTENDANCE_CHANNEL";
const SUMMARY_CHANNEL_ENV: &str = "ROLLCALL_SUMMARY_CHANNEL";

/// Longest report window, one leap year of days.
pub const MAX_REPORT_DAYS: u32 = 366;

/// When things fire. Times are `HH:MM` in the reference offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_daily_time")]
    pub daily_time: String,
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,
    #[serde(default = "default_weekly_day")]
    pub weekly_day: String,
    #[serde(default = "default_weekly_time")]
    pub weekly_time: String,
    /// Hours east of UTC used for day keys and trigger times.
    #[serde(default)]
    pub utc_offset_hours: i32,
}

/// Daily prompt configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinConfig {
    /// `{signal}` and `{hours}` are replaced with the accepted signal and
    /// the window length.
    #[serde(default = "default_prompt_text")]
    pub prompt_text: String,
    /// The only acknowledgement signal that counts.
    #[serde(default = "default_signal")]
    pub signal: String,
}

/// Weekly report configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_title")]
    pub title: String,
    #[serde(default = "default_fallback_line")]
    pub fallback_line: String,
    #[serde(default = "default_report_days")]
    pub days: u32,
}

/// Bindings applied to a brand-new attendance document only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelsConfig {
    #[serde(default)]
    pub attendance: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/rollcall/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Attendance document location; defaults to `attendance.json` in the
    /// data directory.
    #[serde(default)]
    pub state_file: Option<PathBuf>,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub checkin: CheckinConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub channels: ChannelsConfig,
}

// Default functions
fn default_daily_time() -> String {
    "09:00".into()
}
fn default_window_hours() -> u32 {
    12
}
fn default_weekly_day() -> String {
    "sun".into()
}
fn default_weekly_time() -> String {
    "10:00".into()
}
fn default_prompt_text() -> String {
    "🕒 **Daily Attendance Check!** Staff please react with {signal} within {hours} hours.".into()
}
fn default_signal() -> String {
    "✅".into()
}
fn default_report_title() -> String {
    "📅 Weekly Staff Attendance Report".into()
}
fn default_fallback_line() -> String {
    "No data yet.".into()
}
fn default_report_days() -> u32 {
    7
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            daily_time: default_daily_time(),
            window_hours: default_window_hours(),
            weekly_day: default_weekly_day(),
            weekly_time: default_weekly_time(),
            utc_offset_hours: 0,
        }
    }
}

impl Default for CheckinConfig {
    fn default() -> Self {
        Self {
            prompt_text: default_prompt_text(),
            signal: default_signal(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_report_title(),
            fallback_line: default_fallback_line(),
            days: default_report_days(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_file: None,
            schedule: ScheduleConfig::default(),
            checkin: CheckinConfig::default(),
            report: ReportConfig::default(),
            channels: ChannelsConfig::default(),
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
        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<i64>() {
                        serde_json::Value::Number(n.into())
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as integer")));
                    }
                }
                serde_json::Value::Object(_) => return Err(unknown()),
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| failed(e.to_string()))
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

    /// Set a config value by key and save. Values are validated by
    /// rebuilding [`ServiceSettings`] before anything is written.
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
        updated.service_settings()?;
        *self = updated;
        self.save()
    }

    /// Where the attendance document lives.
    pub fn state_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.state_file {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("attendance.json")),
        }
    }

    /// Bindings for a document that has never been saved. Config values win
    /// over the environment.
    pub fn seed_bindings(&self) -> ChannelBindings {
        let pick = |configured: &Option<String>, env: &str| {
            configured
                .clone()
                .or_else(|| std::env::var(env).ok())
                .filter(|id| !id.is_empty())
                .map(ChannelId::new)
        };
        ChannelBindings {
            attendance_channel_id: pick(&self.channels.attendance, ATTENDANCE_CHANNEL_ENV),
            summary_channel_id: pick(&self.channels.summary, SUMMARY_CHANNEL_ENV),
        }
    }

    /// Validate the schedule/report sections into runtime settings.
    pub fn service_settings(&self) -> Result<ServiceSettings, ConfigError> {
        let sched = &self.schedule;
        let utc_offset = sched
            .utc_offset_hours
            .checked_mul(3600)
            .and_then(chrono::FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "schedule.utc_offset_hours".into(),
                message: format!("{} is outside -23..=23", sched.utc_offset_hours),
            })?;
        if sched.window_hours == 0 || sched.window_hours > 24 {
            return Err(ConfigError::InvalidValue {
                key: "schedule.window_hours".into(),
                message: "must be between 1 and 24".into(),
            });
        }
        if self.report.days == 0 || self.report.days > MAX_REPORT_DAYS {
            return Err(ConfigError::InvalidValue {
                key: "report.days".into(),
                message: format!("must be between 1 and {MAX_REPORT_DAYS}"),
            });
        }
        if self.checkin.signal.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "checkin.signal".into(),
                message: "must not be empty".into(),
            });
        }

        Ok(ServiceSettings {
            utc_offset,
            window: chrono::TimeDelta::hours(i64::from(sched.window_hours)),
            daily: DailyTrigger::parse(&sched.daily_time)?,
            weekly: WeeklyTrigger::parse(&sched.weekly_day, &sched.weekly_time)?,
            prompt_text: self
                .checkin
                .prompt_text
                .replace("{signal}", &self.checkin.signal)
                .replace("{hours}", &sched.window_hours.to_string()),
            signal: self.checkin.signal.clone(),
            report_title: self.report.title.clone(),
            report_fallback: self.report.fallback_line.clone(),
            report_days: self.report.days,
        })
    }
}
