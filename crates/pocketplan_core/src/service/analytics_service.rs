//! Analytics use-case service.
//!
//! Loads the snapshots the pure analytics functions need and exposes the
//! dashboard summary as a live query.

use crate::analytics::{
    category_ranking, daily_spend, summarize, AnalyticsSummary, CategoryRank, DailySpendSeries,
    TimeRange,
};
use crate::live::{LiveQuery, QueryState};
use crate::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use crate::repo::expense_repo::{ExpenseListQuery, ExpenseRepository, SqliteExpenseRepository};
use crate::repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
use crate::repo::Table;
use crate::service::expense_service::current_month_expenses;
use crate::service::ServiceResult;
use crate::store::Store;
use chrono::NaiveDate;
use rusqlite::Connection;

const SUMMARY_TABLES: [Table; 4] = [
    Table::Settings,
    Table::Categories,
    Table::Expenses,
    Table::Tasks,
];

/// Read-only analytics over the store.
pub struct AnalyticsService<'s> {
    store: &'s Store,
}

impl<'s> AnalyticsService<'s> {
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    /// Dashboard summary for the budgeting month containing `today`.
    pub fn summary(&self, today: NaiveDate) -> ServiceResult<AnalyticsSummary> {
        self.store.read(|conn| load_summary(conn, today))
    }

    /// Zero-filled daily spend over the trailing `range`, ending on `today`.
    pub fn daily_spend(&self, today: NaiveDate, range: TimeRange) -> ServiceResult<DailySpendSeries> {
        let expenses = self.store.read(|conn| {
            SqliteExpenseRepository::new(conn).list(&ExpenseListQuery::default())
        })?;
        Ok(daily_spend(&expenses, today, range))
    }

    /// Current-month spend per category, highest first.
    pub fn category_ranking(
        &self,
        today: NaiveDate,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<CategoryRank>> {
        self.store.read(|conn| {
            let expenses = current_month_expenses(conn, today)?;
            let categories = SqliteCategoryRepository::new(conn).list()?;
            Ok(category_ranking(&expenses, &categories, limit))
        })
    }

    /// Live summary, refreshed on any change to settings, categories,
    /// expenses or tasks.
    pub fn subscribe_summary(
        &self,
        today: NaiveDate,
        on_change: impl FnMut(&QueryState<AnalyticsSummary>) + 'static,
    ) -> LiveQuery<AnalyticsSummary> {
        self.store.subscribe(
            &SUMMARY_TABLES,
            move |conn| load_summary(conn, today),
            on_change,
        )
    }
}

fn load_summary(conn: &Connection, today: NaiveDate) -> ServiceResult<AnalyticsSummary> {
    let settings = SqliteSettingsRepository::new(conn).current()?;
    let categories = SqliteCategoryRepository::new(conn).list()?;
    let expenses = current_month_expenses(conn, today)?;
    let tasks = SqliteTaskRepository::new(conn).list(&TaskListQuery::default())?;
    Ok(summarize(
        settings.as_ref(),
        &categories,
        &expenses,
        &tasks,
        today,
    ))
}
