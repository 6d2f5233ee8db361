//! Task repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Tasks list newest first (`created_at DESC, id ASC`).
//! - Deleting a task relies on the `time_blocks.task_id` cascade; the
//!   connection must have `foreign_keys=ON`.

use crate::model::task::{Task, TaskId, TaskPatch};
use crate::repo::{
    bool_to_int, ensure_connection_ready, parse_bool, parse_uuid, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    category_id,
    is_completed,
    is_archived,
    created_at,
    is_urgent,
    is_important
FROM tasks";

/// Repository interface for task persistence.
pub trait TaskRepository {
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Writes `is_completed` as given, without reading the stored value.
    fn set_completed(&self, id: TaskId, is_completed: bool) -> RepoResult<()>;
    /// Writes only the fields present in `patch`.
    fn apply_patch(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<()>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["tasks", "time_blocks"])?;
        Ok(Self::new(conn))
    }

    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId> {
        insert_task_row(self.conn, task)?;
        Ok(task.id)
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} ORDER BY created_at DESC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn set_completed(&self, id: TaskId, is_completed: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET is_completed = ?1 WHERE id = ?2;",
            params![bool_to_int(is_completed), id.to_string()],
        )?;
        if changed == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    fn apply_patch(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<()> {
        let mut assignments: Vec<&'static str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(title) = &patch.title {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let Some(description) = &patch.description {
            assignments.push("description = ?");
            bind_values.push(description.clone().map_or(Value::Null, Value::Text));
        }
        if let Some(category_id) = patch.category_id {
            assignments.push("category_id = ?");
            bind_values.push(category_id.map_or(Value::Null, |id| Value::Text(id.to_string())));
        }
        for (column, value) in [
            ("is_completed = ?", patch.is_completed),
            ("is_archived = ?", patch.is_archived),
            ("is_urgent = ?", patch.is_urgent),
            ("is_important = ?", patch.is_important),
        ] {
            if let Some(flag) = value {
                assignments.push(column);
                bind_values.push(Value::Integer(bool_to_int(flag)));
            }
        }

        if assignments.is_empty() {
            return match self.get_task(id)? {
                Some(_) => Ok(()),
                None => Err(not_found(id)),
            };
        }

        let sql = format!("UPDATE tasks SET {} WHERE id = ?;", assignments.join(", "));
        bind_values.push(Value::Text(id.to_string()));
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn insert_task_row(conn: &Connection, task: &Task) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO tasks (
            id,
            title,
            description,
            category_id,
            is_completed,
            is_archived,
            created_at,
            is_urgent,
            is_important
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
        params![
            task.id.to_string(),
            task.title.as_str(),
            task.description.as_deref(),
            task.category_id.map(|id| id.to_string()),
            bool_to_int(task.is_completed),
            bool_to_int(task.is_archived),
            task.created_at,
            bool_to_int(task.is_urgent),
            bool_to_int(task.is_important),
        ],
    )?;
    Ok(())
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let category_id = match row.get::<_, Option<String>>("category_id")? {
        Some(value) => Some(parse_uuid(&value, "tasks.category_id")?),
        None => None,
    };

    Ok(Task {
        id: parse_uuid(&id_text, "tasks.id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        category_id,
        is_completed: parse_bool(row.get("is_completed")?, "tasks.is_completed")?,
        is_archived: parse_bool(row.get("is_archived")?, "tasks.is_archived")?,
        created_at: row.get("created_at")?,
        is_urgent: parse_bool(row.get("is_urgent")?, "tasks.is_urgent")?,
        is_important: parse_bool(row.get("is_important")?, "tasks.is_important")?,
    })
}

fn not_found(id: TaskId) -> RepoError {
    RepoError::NotFound { entity: "task", id }
}
