//! Local-first budgeting and task tracking core.
//!
//! A SQLite-backed record store for settings, budget categories, expenses,
//! projects and tasks; live queries that re-deliver results after every
//! committed write; and pure analytics over the delivered snapshots.

pub mod analytics;
pub mod db;
pub mod format;
pub mod live;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use analytics::{AnalyticsSummary, MonthWindow, PeriodError};
pub use db::{DbError, DbResult};
pub use format::{format_currency, format_currency_with, DigitGrouping};
pub use live::{LiveQuery, QueryState};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::{Category, CategoryPatch, NewCategory};
pub use model::expense::{Expense, ExpensePatch, NewExpense};
pub use model::project::{NewProject, Project, ProjectPatch, ProjectStatus};
pub use model::settings::{NewSettings, Settings, SettingsPatch};
pub use model::task::{NewTask, Task, TaskPatch};
pub use model::{parse_record_id, ModelValidationError, Priority, RecordId};
pub use repo::task_repo::ProjectScope;
pub use repo::{RepoError, RepoResult, Table};
pub use service::analytics_service::AnalyticsService;
pub use service::category_service::CategoryService;
pub use service::expense_service::ExpenseService;
pub use service::project_service::ProjectService;
pub use service::seed_service::seed_default_data;
pub use service::settings_service::SettingsService;
pub use service::task_service::TaskService;
pub use service::{ServiceError, ServiceResult};
pub use store::Store;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
