//! Runtime configuration resolution.
//!
//! # Responsibility
//! - Resolve database path, log settings and schedule grid bounds.
//!
//! # Invariants
//! - Precedence is explicit override, then environment, then default.
//! - Blank environment values count as unset.

use crate::logging::default_log_level;
use crate::view::schedule::{ScheduleGrid, DEFAULT_FIRST_HOUR, DEFAULT_LAST_HOUR};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "TASKBOX_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "TASKBOX_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "TASKBOX_LOG_DIR";
pub const GRID_START_ENV: &str = "TASKBOX_GRID_START";
pub const GRID_END_ENV: &str = "TASKBOX_GRID_END";

const APP_DIR_NAME: &str = "taskbox";
const DB_FILE_NAME: &str = "taskbox.db";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidHour { key: &'static str, value: String },
    InvalidGrid { first_hour: u32, last_hour: u32 },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHour { key, value } => {
                write!(f, "`{key}` must be an hour 0-23, got `{value}`")
            }
            Self::InvalidGrid {
                first_hour,
                last_hour,
            } => write!(
                f,
                "schedule grid {first_hour}..{last_hour} is invalid; need start <= end <= 23"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Values supplied directly by the caller (for example CLI flags).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub db_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub grid: ScheduleGrid,
}

impl AppConfig {
    /// Resolves configuration from overrides and the process environment.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolves configuration with a caller-supplied environment lookup.
    pub fn resolve_with(
        overrides: ConfigOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let lookup = |key: &str| {
            env(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = overrides
            .db_path
            .or_else(|| lookup(DB_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(default_db_path);
        let log_level = overrides
            .log_level
            .or_else(|| lookup(LOG_LEVEL_ENV))
            .unwrap_or_else(|| default_log_level().to_string());
        let log_dir = overrides
            .log_dir
            .or_else(|| lookup(LOG_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| default_log_dir(&db_path));

        let first_hour = parse_hour(GRID_START_ENV, lookup(GRID_START_ENV))?
            .unwrap_or(DEFAULT_FIRST_HOUR);
        let last_hour =
            parse_hour(GRID_END_ENV, lookup(GRID_END_ENV))?.unwrap_or(DEFAULT_LAST_HOUR);
        let grid = ScheduleGrid::new(first_hour, last_hour).ok_or(ConfigError::InvalidGrid {
            first_hour,
            last_hour,
        })?;

        Ok(Self {
            db_path,
            log_level,
            log_dir,
            grid,
        })
    }
}

/// `<data-local dir>/taskbox/taskbox.db`, or the temp dir when the platform
/// has no data directory.
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
        .join(DB_FILE_NAME)
}

fn default_log_dir(db_path: &std::path::Path) -> PathBuf {
    let base = db_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);
    let dir = base.join(LOG_DIR_NAME);
    if dir.is_absolute() {
        dir
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&dir))
            .unwrap_or(dir)
    }
}

fn parse_hour(key: &'static str, value: Option<String>) -> Result<Option<u32>, ConfigError> {
    match value {
        None => Ok(None),
        Some(raw) => match raw.parse::<u32>() {
            Ok(hour) if hour <= 23 => Ok(Some(hour)),
            _ => Err(ConfigError::InvalidHour { key, value: raw }),
        },
    }
}
