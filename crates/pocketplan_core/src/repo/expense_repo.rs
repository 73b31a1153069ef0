//! Expense repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Date filters are inclusive on both ends (`date_from <= date <= date_to`).
//! - Rows with equal dates are ordered by id so listings stay deterministic.

use super::{RepoError, RepoResult, SortDirection, Table};
use crate::model::expense::{Expense, ExpensePatch, NewExpense};
use crate::model::{EpochMillis, RecordId};
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const EXPENSE_SELECT_SQL: &str = "SELECT
    id,
    category_id,
    amount,
    note,
    date,
    created_at,
    updated_at
FROM expenses";

/// Query options for listing expenses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseListQuery {
    /// Exact match on the (weak) category reference.
    pub category_id: Option<RecordId>,
    /// Inclusive lower bound on `date`.
    pub date_from: Option<NaiveDateTime>,
    /// Inclusive upper bound on `date`.
    pub date_to: Option<NaiveDateTime>,
    /// Ordering on `date`.
    pub order: SortDirection,
}

impl ExpenseListQuery {
    /// Every expense dated within `[from, to]`, oldest first.
    pub fn between(from: NaiveDateTime, to: NaiveDateTime) -> Self {
        Self {
            date_from: Some(from),
            date_to: Some(to),
            ..Self::default()
        }
    }

    /// Every expense, newest first.
    pub fn newest_first() -> Self {
        Self {
            order: SortDirection::Descending,
            ..Self::default()
        }
    }
}

/// Repository interface for expenses.
pub trait ExpenseRepository {
    fn add(&self, expense: &NewExpense, now: EpochMillis) -> RepoResult<RecordId>;
    fn update(&self, id: RecordId, patch: &ExpensePatch, now: EpochMillis) -> RepoResult<()>;
    fn delete(&self, id: RecordId) -> RepoResult<bool>;
    fn get(&self, id: RecordId) -> RepoResult<Option<Expense>>;
    fn list(&self, query: &ExpenseListQuery) -> RepoResult<Vec<Expense>>;
}

/// SQLite-backed expense repository.
pub struct SqliteExpenseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteExpenseRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ExpenseRepository for SqliteExpenseRepository<'_> {
    fn add(&self, expense: &NewExpense, now: EpochMillis) -> RepoResult<RecordId> {
        expense.validate()?;

        self.conn.execute(
            "INSERT INTO expenses (
                category_id,
                amount,
                note,
                date,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
            params![
                expense.category_id,
                expense.amount,
                expense.note.as_str(),
                expense.date,
                now,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, id: RecordId, patch: &ExpensePatch, now: EpochMillis) -> RepoResult<()> {
        let mut expense = self.get(id)?.ok_or(RepoError::NotFound {
            table: Table::Expenses,
            id,
        })?;
        expense.apply(patch);
        expense.validate()?;

        let changed = self.conn.execute(
            "UPDATE expenses
             SET
                category_id = ?1,
                amount = ?2,
                note = ?3,
                date = ?4,
                updated_at = ?5
             WHERE id = ?6;",
            params![
                expense.category_id,
                expense.amount,
                expense.note.as_str(),
                expense.date,
                now,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                table: Table::Expenses,
                id,
            });
        }

        Ok(())
    }

    fn delete(&self, id: RecordId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM expenses WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn get(&self, id: RecordId) -> RepoResult<Option<Expense>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EXPENSE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_expense_row(row)?));
        }
        Ok(None)
    }

    fn list(&self, query: &ExpenseListQuery) -> RepoResult<Vec<Expense>> {
        let mut sql = format!("{EXPENSE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(category_id) = query.category_id {
            sql.push_str(" AND category_id = ?");
            bind_values.push(Value::Integer(category_id));
        }
        if let Some(from) = query.date_from {
            sql.push_str(" AND date >= ?");
            bind_values.push(Value::Text(format_sql_datetime(from)));
        }
        if let Some(to) = query.date_to {
            sql.push_str(" AND date <= ?");
            bind_values.push(Value::Text(format_sql_datetime(to)));
        }

        let direction = query.order.sql();
        sql.push_str(&format!(" ORDER BY date {direction}, id {direction}"));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut expenses = Vec::new();
        while let Some(row) = rows.next()? {
            expenses.push(parse_expense_row(row)?);
        }
        Ok(expenses)
    }
}

/// Matches the text encoding rusqlite uses for `NaiveDateTime` parameters, so
/// range comparisons stay lexicographic on the same format.
pub(crate) fn format_sql_datetime(value: NaiveDateTime) -> String {
    value.format("%F %T%.f").to_string()
}

fn parse_expense_row(row: &Row<'_>) -> RepoResult<Expense> {
    Ok(Expense {
        id: row.get("id")?,
        category_id: row.get("category_id")?,
        amount: row.get("amount")?,
        note: row.get("note")?,
        date: row.get("date")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
