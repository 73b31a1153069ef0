//! Project use-case service.
//!
//! # Responsibility
//! - Project CRUD routed through the store.
//! - Cascade project deletion to its tasks.
//!
//! # Invariants
//! - Deletion removes the project's tasks first, then the project, as two
//!   separate writes. A failure in between leaves orphaned tasks, which the
//!   weak `project_id` reference tolerates.

use crate::live::{LiveQuery, QueryState};
use crate::model::project::{NewProject, Project, ProjectPatch};
use crate::model::{now_epoch_ms, RecordId};
use crate::repo::project_repo::{ProjectListQuery, ProjectRepository, SqliteProjectRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::repo::{RepoResult, Table};
use crate::store::Store;
use log::info;

/// Use-case service for projects.
pub struct ProjectService<'s> {
    store: &'s Store,
}

impl<'s> ProjectService<'s> {
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    pub fn add(&self, project: &NewProject) -> RepoResult<RecordId> {
        self.store.write(&[Table::Projects], |conn| {
            SqliteProjectRepository::new(conn).add(project, now_epoch_ms())
        })
    }

    pub fn update(&self, id: RecordId, patch: &ProjectPatch) -> RepoResult<()> {
        self.store.write(&[Table::Projects], |conn| {
            SqliteProjectRepository::new(conn).update(id, patch, now_epoch_ms())
        })
    }

    /// Deletes the project and every task referencing it.
    ///
    /// Returns whether the project row existed.
    pub fn delete(&self, id: RecordId) -> RepoResult<bool> {
        let tasks_removed = self.store.write(&[Table::Tasks], |conn| {
            SqliteTaskRepository::new(conn).delete_by_project(id)
        })?;
        let removed = self.store.write(&[Table::Projects], |conn| {
            SqliteProjectRepository::new(conn).delete(id)
        })?;
        info!(
            "event=project_delete module=service status=ok project_id={id} project_removed={removed} tasks_removed={tasks_removed}"
        );
        Ok(removed)
    }

    pub fn get(&self, id: RecordId) -> RepoResult<Option<Project>> {
        self.store
            .read(|conn| SqliteProjectRepository::new(conn).get(id))
    }

    pub fn list(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>> {
        self.store
            .read(|conn| SqliteProjectRepository::new(conn).list(query))
    }

    /// Live view of all projects, newest first.
    pub fn subscribe(
        &self,
        on_change: impl FnMut(&QueryState<Vec<Project>>) + 'static,
    ) -> LiveQuery<Vec<Project>> {
        self.store.subscribe(
            &[Table::Projects],
            |conn| SqliteProjectRepository::new(conn).list(&ProjectListQuery::default()),
            on_change,
        )
    }

    pub fn watch(&self) -> LiveQuery<Vec<Project>> {
        self.subscribe(|_| {})
    }
}
