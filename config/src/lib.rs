//! # Configuration Management for RowHaus
//!
//! This crate provides the configuration structures for the RowHaus store
//! connection.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::DatabaseConfig;
//!
//! let db_config = DatabaseConfig::new("app.db".to_string(), 5000, true, "WAL".to_string());
//! let in_memory = DatabaseConfig::in_memory();
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! [database]
//! path = "app.db"
//! busy_timeout_ms = 5000
//! foreign_keys = true
//! journal_mode = "WAL"
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from the file named by ROWHAUS_CONFIG, or ./rowhaus.toml
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./rowhaus.toml";
const CONFIG_PATH_VAR: &str = "ROWHAUS_CONFIG";
const IN_MEMORY_PATH: &str = ":memory:";
const JOURNAL_MODES: &[&str] = &["DELETE", "TRUNCATE", "PERSIST", "MEMORY", "WAL", "OFF"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    Env(#[from] env::VarError),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path, or `:memory:`
    pub path: String,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,
    #[serde(default = "default_journal_mode")]
    pub journal_mode: String,
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_foreign_keys() -> bool {
    true
}

fn default_journal_mode() -> String {
    "DELETE".to_string()
}

impl AppConfig {
    /// Load configuration from the TOML file named in .env or the environment,
    /// falling back to the default path
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e.into());
            }
        }

        let config = if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            Self::from_file(&config_path)
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)
        } else {
            Err(ConfigError::Invalid(format!(
                "Config path must be specified in .env file as {} or in {} file",
                CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH
            )))
        }?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()
    }
}

impl DatabaseConfig {
    /// Create a new database configuration
    pub fn new(path: String, busy_timeout_ms: u64, foreign_keys: bool, journal_mode: String) -> Self {
        Self {
            path,
            busy_timeout_ms,
            foreign_keys,
            journal_mode,
        }
    }

    /// Private in-memory database with default settings
    pub fn in_memory() -> Self {
        Self::new(
            IN_MEMORY_PATH.to_string(),
            default_busy_timeout_ms(),
            default_foreign_keys(),
            "MEMORY".to_string(),
        )
    }

    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY_PATH
    }

    /// Validate database settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Database path cannot be empty".to_string(),
            ));
        }
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "Database busy_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if !JOURNAL_MODES.contains(&self.journal_mode.to_ascii_uppercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Database journal_mode '{}' is not one of {}",
                self.journal_mode,
                JOURNAL_MODES.join(", ")
            )));
        }
        Ok(())
    }
}
