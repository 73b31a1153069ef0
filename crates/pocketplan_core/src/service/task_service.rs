//! Task use-case service.
//!
//! # Responsibility
//! - Task CRUD routed through the store, with manual ordering.
//! - Completion toggling and due-date views.
//!
//! # Invariants
//! - New tasks are appended: `order = max(order) + 1`, or 0 in an empty table.
//! - `completed` and `completed_at` always change together, through `toggle`
//!   and through `update` alike.

use crate::analytics::{completed_count, overdue_tasks, pending_count, today_tasks};
use crate::live::{LiveQuery, QueryState};
use crate::model::task::{NewTask, Task, TaskPatch};
use crate::model::{now_epoch_ms, RecordId};
use crate::repo::task_repo::{ProjectScope, SqliteTaskRepository, TaskListQuery, TaskRepository};
use crate::repo::{RepoError, RepoResult, Table};
use crate::store::Store;
use chrono::NaiveDate;
use log::debug;
use rusqlite::{Transaction, TransactionBehavior};

/// Use-case service for tasks.
pub struct TaskService<'s> {
    store: &'s Store,
}

impl<'s> TaskService<'s> {
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    /// Appends a task after every existing one.
    pub fn add(&self, task: &NewTask) -> RepoResult<RecordId> {
        self.store.write(&[Table::Tasks], |conn| {
            let repo = SqliteTaskRepository::new(conn);
            let order = repo.max_order()?.map_or(0, |max| max + 1);
            repo.add(task, order, now_epoch_ms())
        })
    }

    pub fn update(&self, id: RecordId, patch: &TaskPatch) -> RepoResult<()> {
        self.store.write(&[Table::Tasks], |conn| {
            SqliteTaskRepository::new(conn).update(id, patch, now_epoch_ms())
        })
    }

    /// Flips completion. Returns the new `completed` value.
    ///
    /// A task deleted in the meantime yields `NotFound`.
    pub fn toggle(&self, id: RecordId) -> RepoResult<bool> {
        self.store.write(&[Table::Tasks], |conn| {
            let repo = SqliteTaskRepository::new(conn);
            let task = repo.get(id)?.ok_or(RepoError::NotFound {
                table: Table::Tasks,
                id,
            })?;
            let now = now_epoch_ms();
            let patch = task.toggled(now);
            repo.update(id, &patch, now)?;
            debug!(
                "event=task_toggle module=service status=ok task_id={id} completed={}",
                !task.completed
            );
            Ok(!task.completed)
        })
    }

    pub fn delete(&self, id: RecordId) -> RepoResult<bool> {
        self.store.write(&[Table::Tasks], |conn| {
            SqliteTaskRepository::new(conn).delete(id)
        })
    }

    /// Assigns `order = position` to each id in one transaction. Unknown ids
    /// are skipped.
    pub fn reorder(&self, ids: &[RecordId]) -> RepoResult<usize> {
        self.store.write(&[Table::Tasks], |conn| {
            let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
            let updated = SqliteTaskRepository::new(&tx).reorder(ids, now_epoch_ms())?;
            tx.commit()?;
            Ok::<_, RepoError>(updated)
        })
    }

    pub fn get(&self, id: RecordId) -> RepoResult<Option<Task>> {
        self.store.read(|conn| SqliteTaskRepository::new(conn).get(id))
    }

    pub fn list(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        self.store
            .read(|conn| SqliteTaskRepository::new(conn).list(query))
    }

    pub fn all(&self) -> RepoResult<Vec<Task>> {
        self.list(&TaskListQuery::default())
    }

    /// Tasks due on `today`, completed or not.
    pub fn due_today(&self, today: NaiveDate) -> RepoResult<Vec<Task>> {
        Ok(today_tasks(&self.all()?, today))
    }

    /// Incomplete tasks due before `today`.
    pub fn overdue(&self, today: NaiveDate) -> RepoResult<Vec<Task>> {
        Ok(overdue_tasks(&self.all()?, today))
    }

    pub fn completed_count(&self) -> RepoResult<usize> {
        Ok(completed_count(&self.all()?))
    }

    pub fn pending_count(&self) -> RepoResult<usize> {
        Ok(pending_count(&self.all()?))
    }

    /// Live view of tasks in `scope`, in manual order.
    pub fn subscribe(
        &self,
        scope: ProjectScope,
        on_change: impl FnMut(&QueryState<Vec<Task>>) + 'static,
    ) -> LiveQuery<Vec<Task>> {
        let query = TaskListQuery {
            project: scope,
            ..TaskListQuery::default()
        };
        self.store.subscribe(
            &[Table::Tasks],
            move |conn| SqliteTaskRepository::new(conn).list(&query),
            on_change,
        )
    }

    pub fn subscribe_all(
        &self,
        on_change: impl FnMut(&QueryState<Vec<Task>>) + 'static,
    ) -> LiveQuery<Vec<Task>> {
        self.subscribe(ProjectScope::Any, on_change)
    }

    pub fn watch(&self, scope: ProjectScope) -> LiveQuery<Vec<Task>> {
        self.subscribe(scope, |_| {})
    }
}
