//! Runtime configuration for hosts embedding the tracker core.
//!
//! # Responsibility
//! - Resolve database path, graph window size and logging settings.
//! - Read `HABITGRID_*` environment overrides with documented defaults.
//!
//! # Invariants
//! - `window_days` is always within `1..=MAX_WINDOW_DAYS`.
//! - Blank environment values are treated as unset.

use crate::aggregate::DEFAULT_WINDOW_DAYS;
use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "HABITGRID_DB_PATH";
pub const ENV_WINDOW_DAYS: &str = "HABITGRID_WINDOW_DAYS";
pub const ENV_LOG_LEVEL: &str = "HABITGRID_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "HABITGRID_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "habitgrid.sqlite3";
/// Roughly ten years of history.
pub const MAX_WINDOW_DAYS: u32 = 3660;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidWindowDays(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidWindowDays(value) => write!(
                f,
                "window days must be an integer in 1..={MAX_WINDOW_DAYS}, got `{value}`"
            ),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub db_path: PathBuf,
    pub window_days: u32,
    pub log_level: String,
    /// Logging stays disabled when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            window_days: DEFAULT_WINDOW_DAYS,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl TrackerConfig {
    /// Builds a config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(days) = read(ENV_WINDOW_DAYS) {
            config.window_days = parse_window_days(&days)?;
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        Ok(config)
    }
}

/// Parses and range-checks a window length.
pub fn parse_window_days(value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(days) if (1..=MAX_WINDOW_DAYS).contains(&days) => Ok(days),
        _ => Err(ConfigError::InvalidWindowDays(value.to_string())),
    }
}
