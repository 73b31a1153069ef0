//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs over a [`Store`].
//! - Route every mutation through [`Store::write`] so live queries refresh.
//! - Expose one live-query entry point per derived view.
//!
//! # Invariants
//! - Services never hold state of their own; the store is the only owner.
//! - Every write stamps `updated_at` from the wall clock at call time.
//!
//! [`Store`]: crate::store::Store
//! [`Store::write`]: crate::store::Store::write

pub mod analytics_service;
pub mod category_service;
pub mod expense_service;
pub mod project_service;
pub mod seed_service;
pub mod settings_service;
pub mod task_service;

use crate::analytics::PeriodError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of a use-case that combines storage with period math.
#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    Period(PeriodError),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Repo(err) if err.is_not_found())
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Period(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Period(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<PeriodError> for ServiceError {
    fn from(value: PeriodError) -> Self {
        Self::Period(value)
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}
