//! Expense use-case service.
//!
//! # Responsibility
//! - Expense CRUD routed through the store.
//! - Resolve the current budgeting month from settings and query within it.
//!
//! # Invariants
//! - Month-window listings are inclusive on both ends, whole days.
//! - A missing settings row means the month starts on day 1.

use crate::analytics::{month_window, MonthWindow};
use crate::live::{LiveQuery, QueryState};
use crate::model::expense::{Expense, ExpensePatch, NewExpense};
use crate::model::settings::DEFAULT_MONTH_START_DAY;
use crate::model::{now_epoch_ms, RecordId};
use crate::repo::expense_repo::{ExpenseListQuery, ExpenseRepository, SqliteExpenseRepository};
use crate::repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
use crate::repo::{RepoResult, Table};
use crate::service::ServiceResult;
use crate::store::Store;
use chrono::NaiveDate;
use rusqlite::Connection;

/// Use-case service for expenses.
pub struct ExpenseService<'s> {
    store: &'s Store,
}

impl<'s> ExpenseService<'s> {
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    pub fn add(&self, expense: &NewExpense) -> RepoResult<RecordId> {
        self.store.write(&[Table::Expenses], |conn| {
            SqliteExpenseRepository::new(conn).add(expense, now_epoch_ms())
        })
    }

    pub fn update(&self, id: RecordId, patch: &ExpensePatch) -> RepoResult<()> {
        self.store.write(&[Table::Expenses], |conn| {
            SqliteExpenseRepository::new(conn).update(id, patch, now_epoch_ms())
        })
    }

    pub fn delete(&self, id: RecordId) -> RepoResult<bool> {
        self.store.write(&[Table::Expenses], |conn| {
            SqliteExpenseRepository::new(conn).delete(id)
        })
    }

    pub fn get(&self, id: RecordId) -> RepoResult<Option<Expense>> {
        self.store
            .read(|conn| SqliteExpenseRepository::new(conn).get(id))
    }

    pub fn list(&self, query: &ExpenseListQuery) -> RepoResult<Vec<Expense>> {
        self.store
            .read(|conn| SqliteExpenseRepository::new(conn).list(query))
    }

    /// Budgeting month containing `today`, per the current settings row.
    pub fn current_month_window(&self, today: NaiveDate) -> ServiceResult<MonthWindow> {
        self.store.read(|conn| current_window(conn, today))
    }

    /// Expenses dated inside `window`, oldest first.
    pub fn in_window(&self, window: MonthWindow) -> RepoResult<Vec<Expense>> {
        self.list(&ExpenseListQuery::between(window.start_at(), window.end_at()))
    }

    /// Expenses of the budgeting month containing `today`, oldest first.
    pub fn current_month(&self, today: NaiveDate) -> ServiceResult<Vec<Expense>> {
        self.store.read(|conn| current_month_expenses(conn, today))
    }

    /// Live view of expenses inside a fixed window.
    pub fn subscribe_window(
        &self,
        window: MonthWindow,
        on_change: impl FnMut(&QueryState<Vec<Expense>>) + 'static,
    ) -> LiveQuery<Vec<Expense>> {
        let query = ExpenseListQuery::between(window.start_at(), window.end_at());
        self.store.subscribe(
            &[Table::Expenses],
            move |conn| SqliteExpenseRepository::new(conn).list(&query),
            on_change,
        )
    }

    /// Live view of the budgeting month containing `today`.
    ///
    /// The window is re-resolved on every evaluation, so a change to
    /// `month_start_day` moves it. Invalid settings deliver `Pending`.
    pub fn subscribe_current_month(
        &self,
        today: NaiveDate,
        on_change: impl FnMut(&QueryState<Vec<Expense>>) + 'static,
    ) -> LiveQuery<Vec<Expense>> {
        self.store.subscribe(
            &[Table::Settings, Table::Expenses],
            move |conn| current_month_expenses(conn, today),
            on_change,
        )
    }

    /// Live view of every expense, newest first.
    pub fn subscribe_all(
        &self,
        on_change: impl FnMut(&QueryState<Vec<Expense>>) + 'static,
    ) -> LiveQuery<Vec<Expense>> {
        self.store.subscribe(
            &[Table::Expenses],
            |conn| SqliteExpenseRepository::new(conn).list(&ExpenseListQuery::newest_first()),
            on_change,
        )
    }

    pub fn watch_all(&self) -> LiveQuery<Vec<Expense>> {
        self.subscribe_all(|_| {})
    }
}

pub(crate) fn current_window(conn: &Connection, today: NaiveDate) -> ServiceResult<MonthWindow> {
    let month_start_day = SqliteSettingsRepository::new(conn)
        .current()?
        .map_or(DEFAULT_MONTH_START_DAY, |settings| settings.month_start_day);
    Ok(month_window(month_start_day, today)?)
}

pub(crate) fn current_month_expenses(
    conn: &Connection,
    today: NaiveDate,
) -> ServiceResult<Vec<Expense>> {
    let window = current_window(conn, today)?;
    let query = ExpenseListQuery::between(window.start_at(), window.end_at());
    Ok(SqliteExpenseRepository::new(conn).list(&query)?)
}
