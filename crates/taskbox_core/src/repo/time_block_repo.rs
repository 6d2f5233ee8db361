//! Time block repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist slot assignments keyed by `(date, start_time)`.
//! - Express overwrite-on-conflict as a single upsert statement.
//!
//! # Invariants
//! - At most one row per `(date, start_time)`, backed by a UNIQUE constraint.
//! - Dates are stored as `YYYY-MM-DD`, times as `HH:MM`.

use crate::model::time_block::{
    format_date, format_time, parse_date, parse_time, Slot, TimeBlock, TimeBlockId,
};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

const TIME_BLOCK_SELECT_SQL: &str = "SELECT
    id,
    task_id,
    start_time,
    end_time,
    date,
    notes
FROM time_blocks";

/// Repository interface for time block persistence.
pub trait TimeBlockRepository {
    /// Places `block` in its slot, replacing any block already there.
    ///
    /// After the call the slot holds exactly `block`, including its id.
    fn upsert_at_slot(&self, block: &TimeBlock) -> RepoResult<TimeBlockId>;
    fn list_time_blocks(&self) -> RepoResult<Vec<TimeBlock>>;
    /// Lists blocks with `from <= date <= to`.
    fn list_in_range(&self, from: NaiveDate, to: NaiveDate) -> RepoResult<Vec<TimeBlock>>;
    fn get_at_slot(&self, slot: Slot) -> RepoResult<Option<TimeBlock>>;
    fn delete_time_block(&self, id: TimeBlockId) -> RepoResult<()>;
}

/// SQLite-backed time block repository.
pub struct SqliteTimeBlockRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTimeBlockRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["time_blocks"])?;
        Ok(Self::new(conn))
    }

    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TimeBlockRepository for SqliteTimeBlockRepository<'_> {
    fn upsert_at_slot(&self, block: &TimeBlock) -> RepoResult<TimeBlockId> {
        self.conn.execute(
            "INSERT INTO time_blocks (id, task_id, start_time, end_time, date, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(date, start_time) DO UPDATE SET
                id = excluded.id,
                task_id = excluded.task_id,
                end_time = excluded.end_time,
                notes = excluded.notes;",
            params![
                block.id.to_string(),
                block.task_id.to_string(),
                format_time(block.start_time),
                format_time(block.end_time),
                format_date(block.date),
                block.notes.as_deref(),
            ],
        )?;
        Ok(block.id)
    }

    fn list_time_blocks(&self) -> RepoResult<Vec<TimeBlock>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TIME_BLOCK_SELECT_SQL} ORDER BY date ASC, start_time ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut blocks = Vec::new();
        while let Some(row) = rows.next()? {
            blocks.push(parse_time_block_row(row)?);
        }
        Ok(blocks)
    }

    fn list_in_range(&self, from: NaiveDate, to: NaiveDate) -> RepoResult<Vec<TimeBlock>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TIME_BLOCK_SELECT_SQL}
             WHERE date >= ?1 AND date <= ?2
             ORDER BY date ASC, start_time ASC;"
        ))?;
        let mut rows = stmt.query(params![format_date(from), format_date(to)])?;
        let mut blocks = Vec::new();
        while let Some(row) = rows.next()? {
            blocks.push(parse_time_block_row(row)?);
        }
        Ok(blocks)
    }

    fn get_at_slot(&self, slot: Slot) -> RepoResult<Option<TimeBlock>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TIME_BLOCK_SELECT_SQL} WHERE date = ?1 AND start_time = ?2;"
        ))?;
        let mut rows = stmt.query(params![
            format_date(slot.date),
            format_time(slot.start_time)
        ])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_time_block_row(row)?));
        }
        Ok(None)
    }

    fn delete_time_block(&self, id: TimeBlockId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM time_blocks WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "time block",
                id,
            });
        }
        Ok(())
    }
}

fn parse_time_block_row(row: &Row<'_>) -> RepoResult<TimeBlock> {
    let id_text: String = row.get("id")?;
    let task_id_text: String = row.get("task_id")?;
    let date_text: String = row.get("date")?;
    let start_text: String = row.get("start_time")?;
    let end_text: String = row.get("end_time")?;

    Ok(TimeBlock {
        id: parse_uuid(&id_text, "time_blocks.id")?,
        task_id: parse_uuid(&task_id_text, "time_blocks.task_id")?,
        date: parse_date(&date_text).map_err(|_| {
            RepoError::InvalidData(format!("invalid date `{date_text}` in time_blocks.date"))
        })?,
        start_time: parse_time(&start_text).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid time `{start_text}` in time_blocks.start_time"
            ))
        })?,
        end_time: parse_time(&end_text).map_err(|_| {
            RepoError::InvalidData(format!("invalid time `{end_text}` in time_blocks.end_time"))
        })?,
        notes: row.get("notes")?,
    })
}
