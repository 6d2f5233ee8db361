//! Category repository contracts and SQLite implementation.

use crate::model::category::{Category, CategoryId};
use crate::repo::{bool_to_int, ensure_connection_ready, parse_bool, parse_uuid, RepoResult};
use rusqlite::{params, Connection, Row};

const CATEGORY_SELECT_SQL: &str = "SELECT id, name, color, is_system FROM categories";

/// Repository interface for category persistence.
pub trait CategoryRepository {
    fn insert_category(&self, category: &Category) -> RepoResult<CategoryId>;
    /// Inserts all categories or none.
    fn insert_categories(&self, categories: &[Category]) -> RepoResult<()>;
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    fn count_categories(&self) -> RepoResult<u64>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["categories"])?;
        Ok(Self::new(conn))
    }

    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn insert_category(&self, category: &Category) -> RepoResult<CategoryId> {
        insert_row(self.conn, category)?;
        Ok(category.id)
    }

    fn insert_categories(&self, categories: &[Category]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for category in categories {
            insert_row(&tx, category)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }
        Ok(categories)
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CATEGORY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }
        Ok(None)
    }

    fn count_categories(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories;", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

fn insert_row(conn: &Connection, category: &Category) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO categories (id, name, color, is_system) VALUES (?1, ?2, ?3, ?4);",
        params![
            category.id.to_string(),
            category.name.as_str(),
            category.color.as_str(),
            bool_to_int(category.is_system),
        ],
    )?;
    Ok(())
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let id_text: String = row.get("id")?;
    Ok(Category {
        id: parse_uuid(&id_text, "categories.id")?,
        name: row.get("name")?,
        color: row.get("color")?,
        is_system: parse_bool(row.get("is_system")?, "categories.is_system")?,
    })
}
