//! Project repository contracts and SQLite implementation.
//!
//! Deleting a project here removes only the project row; the task cascade is
//! orchestrated by the project service.

use super::{parse_priority, RepoError, RepoResult, Table};
use crate::model::project::{NewProject, Project, ProjectPatch, ProjectStatus};
use crate::model::{EpochMillis, RecordId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    color,
    priority,
    status,
    created_at,
    updated_at
FROM projects";

/// Query options for listing projects. Results are newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectListQuery {
    pub status: Option<ProjectStatus>,
}

/// Repository interface for projects.
pub trait ProjectRepository {
    fn add(&self, project: &NewProject, now: EpochMillis) -> RepoResult<RecordId>;
    fn update(&self, id: RecordId, patch: &ProjectPatch, now: EpochMillis) -> RepoResult<()>;
    fn delete(&self, id: RecordId) -> RepoResult<bool>;
    fn get(&self, id: RecordId) -> RepoResult<Option<Project>>;
    fn list(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn add(&self, project: &NewProject, now: EpochMillis) -> RepoResult<RecordId> {
        project.validate()?;

        self.conn.execute(
            "INSERT INTO projects (
                name,
                description,
                color,
                priority,
                status,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6);",
            params![
                project.name.as_str(),
                project.description.as_str(),
                project.color.as_str(),
                project.priority.as_str(),
                project.status.as_str(),
                now,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, id: RecordId, patch: &ProjectPatch, now: EpochMillis) -> RepoResult<()> {
        let mut project = self.get(id)?.ok_or(RepoError::NotFound {
            table: Table::Projects,
            id,
        })?;
        project.apply(patch);
        project.validate()?;

        let changed = self.conn.execute(
            "UPDATE projects
             SET
                name = ?1,
                description = ?2,
                color = ?3,
                priority = ?4,
                status = ?5,
                updated_at = ?6
             WHERE id = ?7;",
            params![
                project.name.as_str(),
                project.description.as_str(),
                project.color.as_str(),
                project.priority.as_str(),
                project.status.as_str(),
                now,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                table: Table::Projects,
                id,
            });
        }

        Ok(())
    }

    fn delete(&self, id: RecordId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn get(&self, id: RecordId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }

    fn list(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>> {
        let mut sql = format!("{PROJECT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let priority_text: String = row.get("priority")?;
    let status_text: String = row.get("status")?;
    let status = ProjectStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in projects.status"))
    })?;

    Ok(Project {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        color: row.get("color")?,
        priority: parse_priority("projects.priority", &priority_text)?,
        status,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
