//! Process configuration for hosts embedding the core.
//!
//! # Invariants
//! - Blank values are treated as unset.
//! - `log_level` is always a canonical level name.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_KEY: &str = "TABLETOP_DB_PATH";
pub const LOG_LEVEL_KEY: &str = "TABLETOP_LOG_LEVEL";
pub const LOG_DIR_KEY: &str = "TABLETOP_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, message } => write!(f, "invalid {key}: {message}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Default database file for hosts that take no explicit path.
    pub database_path: Option<PathBuf>,
    pub log_level: &'static str,
    /// `None` leaves file logging off.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let log_level = match read(LOG_LEVEL_KEY) {
            Some(level) => normalize_level(&level).map_err(|message| {
                ConfigError::InvalidValue {
                    key: LOG_LEVEL_KEY,
                    message,
                }
            })?,
            None => default_log_level(),
        };

        Ok(Self {
            database_path: read(DB_PATH_KEY).map(PathBuf::from),
            log_level,
            log_dir: read(LOG_DIR_KEY).map(PathBuf::from),
        })
    }
}
