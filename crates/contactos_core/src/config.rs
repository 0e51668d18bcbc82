//! Process configuration resolved from environment variables.
//!
//! # Responsibility
//! - Resolve database location, schema script, and logging settings.
//!
//! # Invariants
//! - Blank values are treated as unset and fall back to defaults.
//! - An explicit log level must be one of `trace|debug|info|warn|error`.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "CONTACTOS_DB_PATH";
pub const ENV_SCHEMA_PATH: &str = "CONTACTOS_SCHEMA_PATH";
pub const ENV_LOG_LEVEL: &str = "CONTACTOS_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CONTACTOS_LOG_DIR";

const DEFAULT_DB_DIR: &str = "database";
const DEFAULT_DB_FILE_NAME: &str = "contactos.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{ENV_LOG_LEVEL}: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactosConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// DDL script; `None` selects the bundled schema.
    pub schema_path: Option<PathBuf>,
    pub log_level: &'static str,
    /// Rolling log directory; `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for ContactosConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            schema_path: None,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl ContactosConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        let log_level = match value(ENV_LOG_LEVEL) {
            Some(level) => normalize_level(&level).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };

        Ok(Self {
            db_path: value(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path),
            schema_path: value(ENV_SCHEMA_PATH).map(PathBuf::from),
            log_level,
            log_dir: value(ENV_LOG_DIR).map(PathBuf::from),
        })
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_DIR).join(DEFAULT_DB_FILE_NAME)
}
