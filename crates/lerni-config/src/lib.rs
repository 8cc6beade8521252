//! # lerni-config
//!
//! Layered configuration loading for Lerni using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`LERNI_*` prefix, `__` as separator)
//! 2. User-level `~/.lerni/config.toml`
//! 3. XDG `~/.config/lerni/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `LERNI_REVIEW__LOOKAHEAD_DAYS` -> `review.lookahead_days`,
//! `LERNI_GENERAL__EDITOR` -> `general.editor`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use lerni_config::LerniConfig;
//!
//! let config = LerniConfig::load_with_dotenv().expect("config");
//! println!("database lives in {}", config.data_dir().expect("home").display());
//! ```

mod error;
mod general;
mod notifications;
mod review;
mod storage;

pub use error::ConfigError;
pub use general::GeneralConfig;
pub use notifications::NotificationsConfig;
pub use review::ReviewConfig;
pub use storage::StorageConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory under `$HOME` holding the user config and, by default, the database.
pub const DATA_DIR_NAME: &str = ".lerni";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LerniConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub review: ReviewConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl LerniConfig {
    /// Load and validate configuration from TOML files and environment variables.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.env` from the current directory, then [`Self::load`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer extra providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = Self::xdg_config_path().filter(|p| p.exists()) {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = Self::user_config_path().filter(|p| p.exists()) {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("LERNI_").split("__"))
    }

    /// Reject values that would only fail later, at the point of use.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.default_limit == 0 {
            return Err(ConfigError::invalid(
                "general.default_limit",
                "must be at least 1",
            ));
        }
        if self.storage.max_attempts == 0 {
            return Err(ConfigError::invalid(
                "storage.max_attempts",
                "must be at least 1",
            ));
        }
        if self.storage.base_delay_ms > self.storage.max_delay_ms {
            return Err(ConfigError::invalid(
                "storage.base_delay_ms",
                "must not exceed storage.max_delay_ms",
            ));
        }
        self.notifications.reminder_hour_minute()?;
        Ok(())
    }

    /// Directory holding the database: `general.data_dir`, else `~/.lerni`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoHomeDir` if no override is set and the home
    /// directory is unknown.
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.general.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::home_dir()
                .map(|home| home.join(DATA_DIR_NAME))
                .ok_or(ConfigError::NoHomeDir),
        }
    }

    /// `~/.lerni/config.toml`.
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(DATA_DIR_NAME).join("config.toml"))
    }

    /// `~/.config/lerni/config.toml` (or the platform equivalent).
    #[must_use]
    pub fn xdg_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lerni").join("config.toml"))
    }
}
