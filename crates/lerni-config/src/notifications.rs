//! Desktop reminder configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_enabled() -> bool {
    true
}

fn default_reminder_time() -> String {
    "09:00".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationsConfig {
    /// Whether `study notify` sends anything at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Local time of the daily reminder, `HH:MM` (24-hour).
    #[serde(default = "default_reminder_time")]
    pub reminder_time: String,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            reminder_time: default_reminder_time(),
        }
    }
}

impl NotificationsConfig {
    /// Parse `reminder_time` into `(hour, minute)`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` unless the value is a valid `HH:MM`.
    pub fn reminder_hour_minute(&self) -> Result<(u8, u8), ConfigError> {
        let invalid = || {
            ConfigError::invalid(
                "notifications.reminder_time",
                format!("expected HH:MM, got '{}'", self.reminder_time),
            )
        };
        let (hour, minute) = self.reminder_time.split_once(':').ok_or_else(invalid)?;
        if hour.len() != 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok((hour, minute))
    }
}
