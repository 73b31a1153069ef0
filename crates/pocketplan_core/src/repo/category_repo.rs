//! Budget category repository contracts and SQLite implementation.

use super::{RepoError, RepoResult, Table};
use crate::model::category::{Category, CategoryPatch, NewCategory};
use crate::model::{EpochMillis, RecordId};
use rusqlite::{params, Connection, Row};

const CATEGORY_SELECT_SQL: &str = "SELECT
    id,
    name,
    icon,
    color,
    allocated,
    percentage,
    created_at,
    updated_at
FROM categories";

/// Repository interface for budget categories.
pub trait CategoryRepository {
    fn add(&self, category: &NewCategory, now: EpochMillis) -> RepoResult<RecordId>;
    fn update(&self, id: RecordId, patch: &CategoryPatch, now: EpochMillis) -> RepoResult<()>;
    fn delete(&self, id: RecordId) -> RepoResult<bool>;
    fn get(&self, id: RecordId) -> RepoResult<Option<Category>>;
    /// All categories in insertion (id) order.
    fn list(&self) -> RepoResult<Vec<Category>>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn add(&self, category: &NewCategory, now: EpochMillis) -> RepoResult<RecordId> {
        category.validate()?;

        self.conn.execute(
            "INSERT INTO categories (
                name,
                icon,
                color,
                allocated,
                percentage,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6);",
            params![
                category.name.as_str(),
                category.icon.as_str(),
                category.color.as_str(),
                category.allocated,
                category.percentage,
                now,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, id: RecordId, patch: &CategoryPatch, now: EpochMillis) -> RepoResult<()> {
        let mut category = self.get(id)?.ok_or(RepoError::NotFound {
            table: Table::Categories,
            id,
        })?;
        category.apply(patch);
        category.validate()?;

        let changed = self.conn.execute(
            "UPDATE categories
             SET
                name = ?1,
                icon = ?2,
                color = ?3,
                allocated = ?4,
                percentage = ?5,
                updated_at = ?6
             WHERE id = ?7;",
            params![
                category.name.as_str(),
                category.icon.as_str(),
                category.color.as_str(),
                category.allocated,
                category.percentage,
                now,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                table: Table::Categories,
                id,
            });
        }

        Ok(())
    }

    fn delete(&self, id: RecordId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn get(&self, id: RecordId) -> RepoResult<Option<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CATEGORY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }
        Ok(None)
    }

    fn list(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CATEGORY_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }
        Ok(categories)
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
        icon: row.get("icon")?,
        color: row.get("color")?,
        allocated: row.get("allocated")?,
        percentage: row.get("percentage")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
