//! Configuration for care reminders and task generation.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{CareError, Result};
use crate::notifications::builder::{DEFAULT_REMINDER_HOUR_UTC, ReminderOptions};
use crate::notifications::types::NotificationChannel;

/// Latest valid reminder hour.
pub const MAX_REMINDER_HOUR: u8 = 23;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CareConfig {
    /// Whether reminders are delivered at all. When off, sync clears every
    /// scheduled notification.
    pub notifications_enabled: bool,
    /// Hour of day (0-23, UTC) reminders fire on the due date.
    pub reminder_hour: u8,
    /// Days ahead of the start date that task generation covers.
    pub horizon_days: u32,
    /// Channel reminders are posted to.
    pub channel: NotificationChannel,
}

impl Default for CareConfig {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            reminder_hour: DEFAULT_REMINDER_HOUR_UTC,
            horizon_days: 90,
            channel: NotificationChannel::Care,
        }
    }
}

impl CareConfig {
    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CareError::Config`] if `reminder_hour` exceeds 23 or
    /// `horizon_days` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.reminder_hour > MAX_REMINDER_HOUR {
            return Err(CareError::Config(format!(
                "reminder_hour must be 0-{MAX_REMINDER_HOUR} (got {})",
                self.reminder_hour
            )));
        }
        if self.horizon_days == 0 {
            return Err(CareError::Config("horizon_days must be at least 1".to_owned()));
        }
        Ok(())
    }

    /// Reminder options derived from this config.
    pub fn reminder_options(&self) -> ReminderOptions {
        ReminderOptions {
            reminder_hour: self.reminder_hour,
            channel: self.channel,
        }
    }

    /// Last date of the generation window starting at `start`.
    pub fn window_end(&self, start: NaiveDate) -> NaiveDate {
        start
            .checked_add_days(Days::new(u64::from(self.horizon_days)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| CareError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| CareError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/verdant/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("verdant").join("config.toml")
        } else if let Some(dir) = dirs::config_dir() {
            dir.join("verdant").join("config.toml")
        } else {
            PathBuf::from("/tmp/verdant-config/config.toml")
        }
    }
}
