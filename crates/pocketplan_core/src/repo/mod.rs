//! Record store: repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Provide CRUD and filtered list primitives per table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate records before SQL mutations.
//! - `update` of a missing id fails with `NotFound`; `delete` of a missing id
//!   is a no-op reported as `false`.
//! - Every write stamps `updated_at` with the caller-provided `now`.

pub mod category_repo;
pub mod expense_repo;
pub mod project_repo;
pub mod settings_repo;
pub mod task_repo;

use crate::db::DbError;
use crate::model::{ModelValidationError, Priority, RecordId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persisted tables. Also the unit of change tracking for live queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    Settings,
    Categories,
    Expenses,
    Projects,
    Tasks,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Settings,
        Table::Categories,
        Table::Expenses,
        Table::Projects,
        Table::Tasks,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Settings => "settings",
            Self::Categories => "categories",
            Self::Expenses => "expenses",
            Self::Projects => "projects",
            Self::Tasks => "tasks",
        }
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ModelValidationError),
    Db(DbError),
    NotFound { table: Table, id: RecordId },
    InvalidData(String),
}

impl RepoError {
    /// Whether callers may treat this failure as recoverable and move on.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { table, id } => write!(f, "{table} record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Sort direction for date-like columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(column: &str, value: i64) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

fn parse_priority(column: &str, value: &str) -> RepoResult<Priority> {
    Priority::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid priority `{value}` in {column}"))
    })
}

fn parse_month_start_day(value: i64) -> RepoResult<u32> {
    u32::try_from(value).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid month start day `{value}` in settings.month_start_day"
        ))
    })
}
