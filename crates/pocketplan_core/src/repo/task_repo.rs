//! Task repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Task listings are ordered by `order ASC, id ASC`.
//! - `reorder` and `delete_by_project` run inside one immediate transaction.

use super::expense_repo::format_sql_datetime;
use super::{bool_to_int, int_to_bool, parse_priority, RepoError, RepoResult, Table};
use crate::model::task::{NewTask, Task, TaskPatch};
use crate::model::{EpochMillis, RecordId};
use chrono::NaiveDateTime;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    title,
    description,
    priority,
    due_date,
    completed,
    completed_at,
    sort_order,
    created_at,
    updated_at
FROM tasks";

/// Project filter for task listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectScope {
    /// Tasks regardless of project.
    #[default]
    Any,
    /// Tasks whose weak `project_id` equals the given id.
    Project(RecordId),
    /// Tasks with no project.
    Unassigned,
}

/// Query options for listing tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    pub project: ProjectScope,
    pub completed: Option<bool>,
    /// Inclusive lower bound on `due_date`; tasks without a due date never match.
    pub due_from: Option<NaiveDateTime>,
    /// Exclusive upper bound on `due_date`; tasks without a due date never match.
    pub due_before: Option<NaiveDateTime>,
}

impl TaskListQuery {
    pub fn for_project(project_id: RecordId) -> Self {
        Self {
            project: ProjectScope::Project(project_id),
            ..Self::default()
        }
    }
}

/// Repository interface for tasks.
pub trait TaskRepository {
    fn add(&self, task: &NewTask, order: i64, now: EpochMillis) -> RepoResult<RecordId>;
    fn update(&self, id: RecordId, patch: &TaskPatch, now: EpochMillis) -> RepoResult<()>;
    fn delete(&self, id: RecordId) -> RepoResult<bool>;
    fn get(&self, id: RecordId) -> RepoResult<Option<Task>>;
    fn list(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    /// Highest `order` value, or `None` when the table is empty.
    fn max_order(&self) -> RepoResult<Option<i64>>;
    /// Deletes every task referencing `project_id`; returns removed count.
    fn delete_by_project(&self, project_id: RecordId) -> RepoResult<usize>;
    /// Assigns `order = position` for each id in `ids`; returns updated count.
    /// Ids that no longer exist are skipped. Runs on the caller's connection,
    /// so callers wanting all-or-nothing wrap it in their own transaction.
    fn reorder(&self, ids: &[RecordId], now: EpochMillis) -> RepoResult<usize>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn add(&self, task: &NewTask, order: i64, now: EpochMillis) -> RepoResult<RecordId> {
        task.validate()?;

        let completed_at = task.completed.then_some(now);
        self.conn.execute(
            "INSERT INTO tasks (
                project_id,
                title,
                description,
                priority,
                due_date,
                completed,
                completed_at,
                sort_order,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9);",
            params![
                task.project_id,
                task.title.as_str(),
                task.description.as_str(),
                task.priority.as_str(),
                task.due_date,
                bool_to_int(task.completed),
                completed_at,
                order,
                now,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, id: RecordId, patch: &TaskPatch, now: EpochMillis) -> RepoResult<()> {
        let mut task = self.get(id)?.ok_or(RepoError::NotFound {
            table: Table::Tasks,
            id,
        })?;
        task.apply(patch, now);
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                project_id = ?1,
                title = ?2,
                description = ?3,
                priority = ?4,
                due_date = ?5,
                completed = ?6,
                completed_at = ?7,
                sort_order = ?8,
                updated_at = ?9
             WHERE id = ?10;",
            params![
                task.project_id,
                task.title.as_str(),
                task.description.as_str(),
                task.priority.as_str(),
                task.due_date,
                bool_to_int(task.completed),
                task.completed_at,
                task.order,
                now,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                table: Table::Tasks,
                id,
            });
        }

        Ok(())
    }

    fn delete(&self, id: RecordId) -> RepoResult<bool> {
        let changed = self.conn.execute("DELETE FROM tasks WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn get(&self, id: RecordId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        match query.project {
            ProjectScope::Any => {}
            ProjectScope::Project(project_id) => {
                sql.push_str(" AND project_id = ?");
                bind_values.push(Value::Integer(project_id));
            }
            ProjectScope::Unassigned => sql.push_str(" AND project_id IS NULL"),
        }
        if let Some(completed) = query.completed {
            sql.push_str(" AND completed = ?");
            bind_values.push(Value::Integer(bool_to_int(completed)));
        }
        if let Some(from) = query.due_from {
            sql.push_str(" AND due_date IS NOT NULL AND due_date >= ?");
            bind_values.push(Value::Text(format_sql_datetime(from)));
        }
        if let Some(before) = query.due_before {
            sql.push_str(" AND due_date IS NOT NULL AND due_date < ?");
            bind_values.push(Value::Text(format_sql_datetime(before)));
        }
        sql.push_str(" ORDER BY sort_order ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn max_order(&self) -> RepoResult<Option<i64>> {
        let max = self
            .conn
            .query_row("SELECT MAX(sort_order) FROM tasks;", [], |row| {
                row.get::<_, Option<i64>>(0)
            })?;
        Ok(max)
    }

    fn delete_by_project(&self, project_id: RecordId) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM tasks WHERE project_id = ?1;", [project_id])?;
        Ok(removed)
    }

    fn reorder(&self, ids: &[RecordId], now: EpochMillis) -> RepoResult<usize> {
        let mut updated = 0;
        for (position, id) in ids.iter().enumerate() {
            let changed = self.conn.execute(
                "UPDATE tasks SET sort_order = ?1, updated_at = ?2 WHERE id = ?3;",
                params![position as i64, now, id],
            )?;
            if changed == 0 {
                debug!("event=task_reorder module=repo status=skip task_id={id} reason=not_found");
            }
            updated += changed;
        }
        Ok(updated)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let priority_text: String = row.get("priority")?;

    Ok(Task {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        priority: parse_priority("tasks.priority", &priority_text)?,
        due_date: row.get("due_date")?,
        completed: int_to_bool("tasks.completed", row.get("completed")?)?,
        completed_at: row.get("completed_at")?,
        order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
