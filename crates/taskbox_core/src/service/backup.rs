//! JSON backup export/import and full data reset.
//!
//! # Invariants
//! - Documents carry `format = "taskbox-backup"` and a `version`; anything
//!   else is rejected before storage is touched.
//! - Import and reset run in one transaction: all rows change or none do.
//! - Subtask rows are wiped with everything else but never exported.

use crate::model::category::Category;
use crate::model::task::Task;
use crate::model::time_block::TimeBlock;
use crate::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::repo::time_block_repo::{SqliteTimeBlockRepository, TimeBlockRepository};
use crate::repo::RepoError;
use crate::service::task_store::AppState;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub const BACKUP_FORMAT: &str = "taskbox-backup";
pub const BACKUP_VERSION: u32 = 1;

/// Error for backup serialization and restore.
#[derive(Debug)]
pub enum BackupError {
    Io(std::io::Error),
    Json(serde_json::Error),
    UnsupportedFormat { format: String, version: u32 },
    Repo(RepoError),
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "backup file error: {err}"),
            Self::Json(err) => write!(f, "backup document error: {err}"),
            Self::UnsupportedFormat { format, version } => write!(
                f,
                "unsupported backup `{format}` version {version}; expected `{BACKUP_FORMAT}` version {BACKUP_VERSION}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::UnsupportedFormat { .. } => None,
        }
    }
}

impl From<std::io::Error> for BackupError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for BackupError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<RepoError> for BackupError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for BackupError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// Serialized backup envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupDocument {
    pub format: String,
    pub version: u32,
    /// Unix epoch milliseconds.
    pub exported_at: i64,
    pub categories: Vec<Category>,
    pub tasks: Vec<Task>,
    pub time_blocks: Vec<TimeBlock>,
}

impl BackupDocument {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            format: BACKUP_FORMAT.to_string(),
            version: BACKUP_VERSION,
            exported_at: chrono::Utc::now().timestamp_millis(),
            categories: state.categories.clone(),
            tasks: state.tasks.clone(),
            time_blocks: state.time_blocks.clone(),
        }
    }
}

pub fn export_json(state: &AppState) -> Result<String, BackupError> {
    Ok(serde_json::to_string_pretty(&BackupDocument::from_state(
        state,
    ))?)
}

/// Parses and checks the envelope of a backup document.
pub fn parse_backup(text: &str) -> Result<BackupDocument, BackupError> {
    let document: BackupDocument = serde_json::from_str(text)?;
    if document.format != BACKUP_FORMAT || document.version != BACKUP_VERSION {
        return Err(BackupError::UnsupportedFormat {
            format: document.format,
            version: document.version,
        });
    }
    Ok(document)
}

pub fn write_backup_file(path: impl AsRef<Path>, text: &str) -> Result<(), BackupError> {
    std::fs::write(path, text)?;
    Ok(())
}

pub fn read_backup_file(path: impl AsRef<Path>) -> Result<String, BackupError> {
    Ok(std::fs::read_to_string(path)?)
}

/// Replaces all stored rows with the document contents.
pub fn restore(conn: &Connection, document: &BackupDocument) -> Result<(), BackupError> {
    let tx = conn.unchecked_transaction()?;
    delete_all_rows(&tx)?;

    let categories = SqliteCategoryRepository::new(&tx);
    for category in &document.categories {
        categories.insert_category(category)?;
    }
    let tasks = SqliteTaskRepository::new(&tx);
    for task in &document.tasks {
        tasks.insert_task(task)?;
    }
    let blocks = SqliteTimeBlockRepository::new(&tx);
    for block in &document.time_blocks {
        blocks.upsert_at_slot(block)?;
    }

    tx.commit()?;
    Ok(())
}

/// Deletes every row from every table.
pub fn wipe(conn: &Connection) -> Result<(), BackupError> {
    let tx = conn.unchecked_transaction()?;
    delete_all_rows(&tx)?;
    tx.commit()?;
    Ok(())
}

fn delete_all_rows(conn: &Connection) -> Result<(), BackupError> {
    conn.execute_batch(
        "DELETE FROM time_blocks;
         DELETE FROM subtasks;
         DELETE FROM tasks;
         DELETE FROM categories;",
    )?;
    Ok(())
}
