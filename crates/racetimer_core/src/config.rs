//! Runtime configuration for hosts embedding the core.
//!
//! # Responsibility
//! - Resolve database path and logging settings from the environment.
//! - Provide defaults that work without any configuration.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - `log_level` is always one of the levels `init_logging` accepts.

use crate::logging::{default_log_level, normalize_level};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "RACETIMER_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "RACETIMER_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "RACETIMER_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "racetimer.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "racetimer-logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved settings for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    pub log_dir: PathBuf,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let temp = std::env::temp_dir();
        Self {
            db_path: temp.join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: temp.join(DEFAULT_LOG_DIR_NAME),
        }
    }
}

impl CoreConfig {
    /// Reads `RACETIMER_*` variables from the process environment.
    ///
    /// # Errors
    /// - `InvalidLogLevel` for an unsupported `RACETIMER_LOG_LEVEL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars = [DB_PATH_ENV, LOG_LEVEL_ENV, LOG_DIR_ENV]
            .into_iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key, value)))
            .collect::<HashMap<_, _>>();
        Self::from_vars(&vars)
    }

    /// Builds a config from an explicit variable map.
    pub fn from_vars(vars: &HashMap<&str, String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = non_blank(vars, DB_PATH_ENV) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = non_blank(vars, LOG_LEVEL_ENV) {
            config.log_level = normalize_level(level).map_err(ConfigError::InvalidLogLevel)?;
        }
        if let Some(dir) = non_blank(vars, LOG_DIR_ENV) {
            config.log_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

fn non_blank<'a>(vars: &'a HashMap<&str, String>, key: &str) -> Option<&'a str> {
    vars.get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}
