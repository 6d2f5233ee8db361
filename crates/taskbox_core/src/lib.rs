//! Core domain logic for Taskbox: a to-do inbox, an Eisenhower matrix and a
//! calendar scheduler over one local SQLite database.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use config::{AppConfig, ConfigError, ConfigOverrides};
pub use logging::{default_log_level, init_logging, LoggingError};
pub use model::category::{Category, CategoryId};
pub use model::task::{Quadrant, Task, TaskId, TaskPatch};
pub use model::time_block::{parse_date, parse_time, Slot, TimeBlock, TimeBlockId};
pub use model::ModelValidationError;
pub use repo::{RepoError, RepoResult};
pub use service::backup::{BackupDocument, BackupError};
pub use service::task_store::{AppState, StoreError, StoreResult, TaskStore};
pub use view::inbox::InboxView;
pub use view::matrix::MatrixView;
pub use view::schedule::{AssignFlow, Assignment, CalendarMode, ScheduleGrid, ScheduleView};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
