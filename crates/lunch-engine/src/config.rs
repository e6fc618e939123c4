//! # Engine Configuration
//!
//! ## Load Order (later overrides earlier)
//! 1. Defaults
//! 2. `lunch.toml` in the platform config directory (or an explicit path)
//! 3. Environment variables
//!
//! ## Environment Variables
//! - `LUNCH_LOG`: tracing filter
//! - `LUNCH_DEFAULT_MENU`: menu given to a day on calendar click
//!
//! ## Example
//! ```toml
//! [logging]
//! filter = "info,lunch=debug,sqlx=warn"
//!
//! [reservations]
//! default_menu = "Normal"
//!
//! [test_user]
//! email = "test@example.com"
//! password = "test123456"
//! full_name = "Usuario de Prueba"
//! employee_id = "EMP001"
//! department = "Tecnología"
//! ```

use std::path::{Path, PathBuf};

use lunch_core::{MenuType, ProfileAttributes};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::telemetry::DEFAULT_LOG_FILTER;

const CONFIG_FILE: &str = "lunch.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationSettings {
    /// Menu given to a day selected with a plain calendar click.
    pub default_menu: MenuType,
}

/// Development account, signed in (and created if needed) on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestUserConfig {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub employee_id: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl TestUserConfig {
    pub fn attributes(&self) -> ProfileAttributes {
        ProfileAttributes {
            full_name: self.full_name.clone(),
            employee_id: self.employee_id.clone(),
            department: self.department.clone(),
            role: self.role.clone(),
        }
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub reservations: ReservationSettings,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_user: Option<TestUserConfig>,
}

impl EngineConfig {
    /// Loads defaults, then the config file, then the environment.
    pub fn load(config_path: Option<PathBuf>) -> EngineResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or falls back to defaults (with environment overrides).
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load engine config, using defaults");
            let mut config = Self::default();
            config.apply_overrides(|key| std::env::var(key).ok());
            config
        })
    }

    pub fn from_file(path: &Path) -> EngineResult<Self> {
        info!(?path, "Loading engine config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> EngineResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| EngineError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, toml::to_string_pretty(self)?)?;

        info!(?path, "Engine config saved");
        Ok(())
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.logging.filter.trim().is_empty() {
            return Err(EngineError::Config("logging.filter must not be empty".into()));
        }

        Ok(())
    }

    /// Applies `LUNCH_*` overrides read through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(filter) = lookup("LUNCH_LOG") {
            self.logging.filter = filter;
        }

        if let Some(menu) = lookup("LUNCH_DEFAULT_MENU") {
            match menu.parse::<MenuType>() {
                Ok(parsed) => self.reservations.default_menu = parsed,
                Err(e) => warn!(menu = %menu, error = %e, "Ignoring LUNCH_DEFAULT_MENU"),
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "lunch", "reservations")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
