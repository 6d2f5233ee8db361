//! Task/schedule manager.
//!
//! # Responsibility
//! - Own the SQLite connection and the cached task, category and time block
//!   collections.
//! - Expose CRUD and slot-assignment use-cases, refetching affected
//!   collections in full after every successful write.
//!
//! # Invariants
//! - The cache only changes through a successful full refetch; a failed
//!   operation leaves it as it was.
//! - A slot holds at most one time block; assigning to an occupied slot
//!   replaces the occupant in one statement.
//! - `toggle_task_completion` writes `!current` using the caller's belief of
//!   the current value. Two toggles racing on stale state can both write the
//!   same value.
//! - Every failure is logged with `status=error` before it is returned.

use crate::db::{open_db, open_db_in_memory};
use crate::model::category::{Category, CategoryId};
use crate::model::task::{Task, TaskId, TaskPatch};
use crate::model::time_block::{Slot, TimeBlock, TimeBlockId};
use crate::model::ModelValidationError;
use crate::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::repo::time_block_repo::{SqliteTimeBlockRepository, TimeBlockRepository};
use crate::repo::{ensure_connection_ready, RepoError};
use crate::service::backup::{self, BackupError};
use chrono::{NaiveDate, NaiveTime};
use log::{debug, error, info};
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Instant;

const REQUIRED_TABLES: &[&str] = &["categories", "tasks", "subtasks", "time_blocks"];

pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by task store operations.
#[derive(Debug)]
pub enum StoreError {
    /// User input rejected before any write.
    Validation(ModelValidationError),
    TaskNotFound(TaskId),
    BlockNotFound(TimeBlockId),
    CategoryNotFound(CategoryId),
    /// Backup document could not be produced or applied.
    Backup(BackupError),
    /// Storage operation failed.
    Repo(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::BlockNotFound(id) => write!(f, "time block not found: {id}"),
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::Backup(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "storage operation failed: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Backup(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "task",
                id,
            } => Self::TaskNotFound(id),
            RepoError::NotFound {
                entity: "time block",
                id,
            } => Self::BlockNotFound(id),
            RepoError::NotFound {
                entity: "category",
                id,
            } => Self::CategoryNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<crate::db::DbError> for StoreError {
    fn from(value: crate::db::DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<ModelValidationError> for StoreError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<BackupError> for StoreError {
    fn from(value: BackupError) -> Self {
        match value {
            BackupError::Repo(err) => Self::from(err),
            other => Self::Backup(other),
        }
    }
}

/// In-memory copy of all collections, as last fetched from storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppState {
    /// Newest first.
    pub tasks: Vec<Task>,
    /// Name order.
    pub categories: Vec<Category>,
    /// `(date, start_time)` order.
    pub time_blocks: Vec<TimeBlock>,
}

impl AppState {
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// Linear scan for the block occupying `slot`.
    pub fn block_at(&self, slot: Slot) -> Option<&TimeBlock> {
        self.time_blocks.iter().find(|block| block.slot() == slot)
    }
}

/// Application state container backed by SQLite.
pub struct TaskStore {
    conn: Connection,
    state: AppState,
}

impl TaskStore {
    /// Opens (and migrates) the database file. The cache starts empty; call
    /// `init_data` to populate it.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Wraps a connection produced by `db::open_db*`.
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        ensure_connection_ready(&conn, REQUIRED_TABLES)?;
        Ok(Self {
            conn,
            state: AppState::default(),
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Owned copy of the current cache.
    pub fn snapshot(&self) -> AppState {
        self.state.clone()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    pub fn categories(&self) -> &[Category] {
        &self.state.categories
    }

    pub fn time_blocks(&self) -> &[TimeBlock] {
        &self.state.time_blocks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.state.task(id)
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.state.category(id)
    }

    /// Replaces the cached task list with the stored one.
    pub fn fetch_tasks(&mut self) -> StoreResult<&[Task]> {
        let started_at = Instant::now();
        let fetched = SqliteTaskRepository::new(&self.conn).list_tasks();
        let tasks = record("tasks_fetch", started_at, fetched.map_err(StoreError::from))?;
        debug!("event=tasks_fetch module=store status=ok count={}", tasks.len());
        self.state.tasks = tasks;
        Ok(&self.state.tasks)
    }

    /// Replaces the cached category list with the stored one.
    pub fn fetch_categories(&mut self) -> StoreResult<&[Category]> {
        let started_at = Instant::now();
        let fetched = SqliteCategoryRepository::new(&self.conn).list_categories();
        let categories = record(
            "categories_fetch",
            started_at,
            fetched.map_err(StoreError::from),
        )?;
        debug!(
            "event=categories_fetch module=store status=ok count={}",
            categories.len()
        );
        self.state.categories = categories;
        Ok(&self.state.categories)
    }

    /// Replaces the cached time block list with the stored one.
    pub fn fetch_time_blocks(&mut self) -> StoreResult<&[TimeBlock]> {
        let started_at = Instant::now();
        let fetched = SqliteTimeBlockRepository::new(&self.conn).list_time_blocks();
        let blocks = record(
            "time_blocks_fetch",
            started_at,
            fetched.map_err(StoreError::from),
        )?;
        debug!(
            "event=time_blocks_fetch module=store status=ok count={}",
            blocks.len()
        );
        self.state.time_blocks = blocks;
        Ok(&self.state.time_blocks)
    }

    /// Startup load: checks the schema, seeds default categories into an
    /// empty category table, then fetches every collection.
    pub fn init_data(&mut self) -> StoreResult<&AppState> {
        let started_at = Instant::now();
        let seeded = self.seed_default_categories();
        let seeded = record("init_data", started_at, seeded)?;
        if seeded > 0 {
            info!("event=categories_seed module=store status=ok count={seeded}");
        }

        self.fetch_categories()?;
        self.fetch_tasks()?;
        self.fetch_time_blocks()?;
        Ok(&self.state)
    }

    fn seed_default_categories(&self) -> StoreResult<usize> {
        ensure_connection_ready(&self.conn, REQUIRED_TABLES)?;
        let repo = SqliteCategoryRepository::new(&self.conn);
        if repo.count_categories()? > 0 {
            return Ok(0);
        }
        let defaults = Category::defaults();
        repo.insert_categories(&defaults)?;
        Ok(defaults.len())
    }

    fn ensure_category(&self, category_id: Option<CategoryId>) -> StoreResult<()> {
        let Some(category_id) = category_id else {
            return Ok(());
        };
        match SqliteCategoryRepository::new(&self.conn).get_category(category_id)? {
            Some(_) => Ok(()),
            None => Err(StoreError::CategoryNotFound(category_id)),
        }
    }

    /// Adds a task with all flags `false`.
    ///
    /// Returns `Ok(None)` without writing when `title` is blank.
    pub fn add_task(
        &mut self,
        title: &str,
        category_id: Option<CategoryId>,
    ) -> StoreResult<Option<TaskId>> {
        let task = match Task::new(title, category_id) {
            Ok(task) => task,
            Err(ModelValidationError::BlankTitle) => {
                debug!("event=task_add module=store status=skip reason=blank_title");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let started_at = Instant::now();
        let inserted = self.ensure_category(task.category_id).and_then(|()| {
            SqliteTaskRepository::new(&self.conn)
                .insert_task(&task)
                .map_err(StoreError::from)
        });
        let task_id = record("task_add", started_at, inserted)?;
        info!("event=task_add module=store status=ok task_id={task_id}");

        self.fetch_tasks()?;
        Ok(Some(task_id))
    }

    /// Adds a user category.
    pub fn add_category(&mut self, name: &str, color: &str) -> StoreResult<CategoryId> {
        let started_at = Instant::now();
        let created = Category::new(name, color)
            .map_err(StoreError::from)
            .and_then(|category| {
                SqliteCategoryRepository::new(&self.conn)
                    .insert_category(&category)
                    .map_err(StoreError::from)
            });
        let category_id = record("category_add", started_at, created)?;
        info!("event=category_add module=store status=ok category_id={category_id}");

        self.fetch_categories()?;
        Ok(category_id)
    }

    /// Sets `is_completed = !current`.
    ///
    /// `current` is the caller's view of the flag; the stored value is not
    /// read first.
    pub fn toggle_task_completion(&mut self, id: TaskId, current: bool) -> StoreResult<&AppState> {
        let started_at = Instant::now();
        let written = SqliteTaskRepository::new(&self.conn).set_completed(id, !current);
        record("task_toggle", started_at, written.map_err(StoreError::from))?;
        info!(
            "event=task_toggle module=store status=ok task_id={id} is_completed={}",
            !current
        );

        self.fetch_tasks()?;
        Ok(&self.state)
    }

    /// Applies a partial update as given. Only a newly linked category is
    /// checked; other fields are written unvalidated.
    pub fn update_task(&mut self, id: TaskId, patch: &TaskPatch) -> StoreResult<&AppState> {
        let started_at = Instant::now();
        let written = self
            .ensure_category(patch.category_id.flatten())
            .and_then(|()| {
                SqliteTaskRepository::new(&self.conn)
                    .apply_patch(id, patch)
                    .map_err(StoreError::from)
            });
        record("task_update", started_at, written)?;
        info!("event=task_update module=store status=ok task_id={id}");

        self.fetch_tasks()?;
        Ok(&self.state)
    }

    /// Deletes a task; its time blocks go with it through the FK cascade.
    pub fn delete_task(&mut self, id: TaskId) -> StoreResult<&AppState> {
        let started_at = Instant::now();
        let deleted = SqliteTaskRepository::new(&self.conn).delete_task(id);
        record("task_delete", started_at, deleted.map_err(StoreError::from))?;
        info!("event=task_delete module=store status=ok task_id={id}");

        self.fetch_tasks()?;
        self.fetch_time_blocks()?;
        Ok(&self.state)
    }

    /// Puts `task_id` into the `(date, time)` slot, replacing any occupant.
    ///
    /// `time` must be a whole hour. The new block has
    /// `end_time == start_time`.
    pub fn assign_task_to_time(
        &mut self,
        task_id: TaskId,
        time: NaiveTime,
        date: NaiveDate,
    ) -> StoreResult<TimeBlockId> {
        let started_at = Instant::now();
        let assigned = Slot::hourly(date, time)
            .map_err(StoreError::from)
            .and_then(|slot| self.upsert_slot(task_id, slot));
        let block_id = record("task_assign", started_at, assigned)?;
        info!(
            "event=task_assign module=store status=ok task_id={task_id} block_id={block_id} date={date} start_time={}",
            time.format("%H:%M")
        );

        self.fetch_time_blocks()?;
        Ok(block_id)
    }

    fn upsert_slot(&self, task_id: TaskId, slot: Slot) -> StoreResult<TimeBlockId> {
        if SqliteTaskRepository::new(&self.conn)
            .get_task(task_id)?
            .is_none()
        {
            return Err(StoreError::TaskNotFound(task_id));
        }
        let block = TimeBlock::for_slot(task_id, slot);
        Ok(SqliteTimeBlockRepository::new(&self.conn).upsert_at_slot(&block)?)
    }

    /// Removes one time block by id.
    pub fn remove_from_schedule(&mut self, block_id: TimeBlockId) -> StoreResult<&AppState> {
        let started_at = Instant::now();
        let deleted = SqliteTimeBlockRepository::new(&self.conn).delete_time_block(block_id);
        record("task_unassign", started_at, deleted.map_err(StoreError::from))?;
        info!("event=task_unassign module=store status=ok block_id={block_id}");

        self.fetch_time_blocks()?;
        Ok(&self.state)
    }

    /// Serializes the current cache as a backup document.
    pub fn export_backup(&self) -> StoreResult<String> {
        let started_at = Instant::now();
        let exported = backup::export_json(&self.state).map_err(StoreError::from);
        let text = record("backup_export", started_at, exported)?;
        info!(
            "event=backup_export module=store status=ok tasks={} categories={} time_blocks={}",
            self.state.tasks.len(),
            self.state.categories.len(),
            self.state.time_blocks.len()
        );
        Ok(text)
    }

    /// Replaces all stored data with the contents of a backup document.
    pub fn import_backup(&mut self, text: &str) -> StoreResult<&AppState> {
        let started_at = Instant::now();
        let restored = backup::parse_backup(text)
            .and_then(|document| backup::restore(&self.conn, &document))
            .map_err(StoreError::from);
        record("backup_import", started_at, restored)?;
        info!("event=backup_import module=store status=ok");

        self.refetch_all()
    }

    /// Deletes every row of every table. Default categories come back on the
    /// next `init_data`.
    pub fn reset_all(&mut self) -> StoreResult<&AppState> {
        let started_at = Instant::now();
        let wiped = backup::wipe(&self.conn).map_err(StoreError::from);
        record("data_reset", started_at, wiped)?;
        info!("event=data_reset module=store status=ok");

        self.refetch_all()
    }

    fn refetch_all(&mut self) -> StoreResult<&AppState> {
        self.fetch_categories()?;
        self.fetch_tasks()?;
        self.fetch_time_blocks()?;
        Ok(&self.state)
    }
}

fn record<T>(event: &'static str, started_at: Instant, result: StoreResult<T>) -> StoreResult<T> {
    if let Err(err) = &result {
        error!(
            "event={} module=store status=error duration_ms={} error={}",
            event,
            started_at.elapsed().as_millis(),
            err
        );
    }
    result
}
