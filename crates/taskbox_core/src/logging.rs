//! Rolling file logs for the taskbox process.
//!
//! Events are `key=value` lines (`event=... module=... status=...`). Task
//! titles and other user text stay out of them; ids and counts go in.
//!
//! The first successful `init_logging` wins for the life of the process.
//! Later calls only validate their level and return `Ok(())`.

use crate::config::AppConfig;
use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const LOG_FILE_BASENAME: &str = "taskbox";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;

static ACTIVE: OnceCell<LoggerHandle> = OnceCell::new();

#[derive(Debug)]
pub enum LoggingError {
    InvalidLevel(String),
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    Backend(FlexiLoggerError),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLevel(value) => write!(
                f,
                "unsupported log level `{value}`; expected off|error|warn|info|debug|trace"
            ),
            Self::CreateDir { path, .. } => {
                write!(f, "cannot create log directory `{}`", path.display())
            }
            Self::Backend(err) => write!(f, "failed to start logger: {err}"),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidLevel(_) => None,
            Self::CreateDir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
        }
    }
}

/// Starts file logging at `config.log_level` under `config.log_dir`.
pub fn init_logging(config: &AppConfig) -> Result<(), LoggingError> {
    let level = parse_level(&config.log_level)?;
    ACTIVE
        .get_or_try_init(|| start(level, config))
        .map(|_| ())
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn parse_level(value: &str) -> Result<LevelFilter, LoggingError> {
    value
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| LoggingError::InvalidLevel(value.trim().to_string()))
}

fn start(level: LevelFilter, config: &AppConfig) -> Result<LoggerHandle, LoggingError> {
    std::fs::create_dir_all(&config.log_dir).map_err(|source| LoggingError::CreateDir {
        path: config.log_dir.clone(),
        source,
    })?;

    let spec = level.to_string().to_ascii_lowercase();
    let handle = Logger::try_with_str(&spec)
        .map_err(LoggingError::Backend)?
        .log_to_file(
            FileSpec::default()
                .directory(config.log_dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(LoggingError::Backend)?;

    log_panics();
    info!(
        "event=app_start module=core status=ok version={} level={spec} db_path={} grid={}..={}",
        env!("CARGO_PKG_VERSION"),
        config.db_path.display(),
        config.grid.first_hour(),
        config.grid.last_hour()
    );
    Ok(handle)
}

fn log_panics() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Payload is left out: it can carry user text.
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!("event=panic module=core status=error location={location}");
        previous(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::{init_logging, parse_level, LoggingError};
    use crate::config::AppConfig;
    use crate::view::schedule::ScheduleGrid;
    use log::LevelFilter;
    use std::path::Path;

    fn config_at(dir: &Path, level: &str) -> AppConfig {
        AppConfig {
            db_path: dir.join("taskbox.db"),
            log_level: level.to_string(),
            log_dir: dir.join("logs"),
            grid: ScheduleGrid::default(),
        }
    }

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!(parse_level(" INFO ").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::Off);
        assert!(matches!(
            parse_level("verbose"),
            Err(LoggingError::InvalidLevel(value)) if value == "verbose"
        ));
    }

    #[test]
    fn first_init_creates_log_dir_and_later_calls_are_no_ops() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();

        init_logging(&config_at(first.path(), "info")).unwrap();
        assert!(first.path().join("logs").is_dir());

        init_logging(&config_at(second.path(), "debug")).unwrap();
        assert!(!second.path().join("logs").exists());

        assert!(init_logging(&config_at(second.path(), "loud")).is_err());
    }
}
