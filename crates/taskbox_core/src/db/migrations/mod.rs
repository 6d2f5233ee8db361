//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register schema migrations in strictly increasing order.
//! - Apply pending migrations atomically.
//! - Upgrade databases written by earlier app revisions, whose tables may be
//!   missing columns.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - A column addition that hits `duplicate column name` counts as applied.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    step: MigrationStep,
}

#[derive(Debug, Clone, Copy)]
enum MigrationStep {
    Sql(&'static str),
    AddColumns(&'static [ColumnAddition]),
}

#[derive(Debug, Clone, Copy)]
struct ColumnAddition {
    table: &'static str,
    column: &'static str,
    definition: &'static str,
}

const LEGACY_COLUMNS: &[ColumnAddition] = &[
    ColumnAddition {
        table: "categories",
        column: "is_system",
        definition: "INTEGER NOT NULL DEFAULT 0",
    },
    ColumnAddition {
        table: "tasks",
        column: "description",
        definition: "TEXT",
    },
    ColumnAddition {
        table: "tasks",
        column: "is_archived",
        definition: "INTEGER NOT NULL DEFAULT 0",
    },
    ColumnAddition {
        table: "time_blocks",
        column: "date",
        definition: "TEXT",
    },
    ColumnAddition {
        table: "time_blocks",
        column: "notes",
        definition: "TEXT",
    },
];

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        step: MigrationStep::Sql(include_str!("0001_init.sql")),
    },
    Migration {
        version: 2,
        step: MigrationStep::AddColumns(LEGACY_COLUMNS),
    },
    Migration {
        version: 3,
        step: MigrationStep::Sql(include_str!("0003_time_block_slots.sql")),
    },
];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        match migration.step {
            MigrationStep::Sql(sql) => tx.execute_batch(sql)?,
            MigrationStep::AddColumns(columns) => {
                for column in columns {
                    add_column_tolerant(&tx, column)?;
                }
            }
        }
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
        info!(
            "event=db_migrate module=db status=ok version={}",
            migration.version
        );
    }
    tx.commit()?;

    Ok(())
}

fn add_column_tolerant(tx: &Transaction<'_>, addition: &ColumnAddition) -> DbResult<()> {
    let sql = format!(
        "ALTER TABLE {} ADD COLUMN {} {};",
        addition.table, addition.column, addition.definition
    );
    match tx.execute_batch(&sql) {
        Ok(()) => Ok(()),
        Err(err) if is_duplicate_column(&err) => Ok(()),
        Err(err @ rusqlite::Error::SqliteFailure(..)) => {
            info!(
                "event=db_migrate module=db status=skip table={} column={} error={}",
                addition.table, addition.column, err
            );
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn is_duplicate_column(err: &rusqlite::Error) -> bool {
    err.to_string().contains("duplicate column name")
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
