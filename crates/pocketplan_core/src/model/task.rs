//! Task record and its completion toggle.
//!
//! # Invariants
//! - `completed` and `completed_at` flip in lockstep: `completed_at` is set
//!   exactly when `completed == true`. A patch that only changes `completed`
//!   stamps or clears `completed_at` itself.
//! - `order` defines manual sort position; uniqueness is not enforced.

use super::{require_text, EpochMillis, ModelValidationError, Priority, RecordId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: RecordId,
    /// Weak reference to a project; may dangle.
    pub project_id: Option<RecordId>,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDateTime>,
    pub completed: bool,
    pub completed_at: Option<EpochMillis>,
    pub order: i64,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
}

/// Input for creating a task. `order` is assigned by the task service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub project_id: Option<RecordId>,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDateTime>,
    pub completed: bool,
}

impl NewTask {
    /// Open task with medium priority and no due date.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            project_id: None,
            title: title.into(),
            description: String::new(),
            priority: Priority::Medium,
            due_date: None,
            completed: false,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("title", &self.title)
    }
}

/// Partial task update. Double options distinguish "keep" (`None`) from
/// "clear" (`Some(None)`) for nullable columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub project_id: Option<Option<RecordId>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDateTime>>,
    pub completed: Option<bool>,
    pub completed_at: Option<Option<EpochMillis>>,
    pub order: Option<i64>,
}

impl Task {
    /// Applies `patch`. A completion change without an explicit
    /// `completed_at` stamps `now` (or clears the stamp when reopening).
    pub fn apply(&mut self, patch: &TaskPatch, now: EpochMillis) {
        if let Some(project_id) = patch.project_id {
            self.project_id = project_id;
        }
        if let Some(title) = patch.title.as_ref() {
            self.title = title.clone();
        }
        if let Some(description) = patch.description.as_ref() {
            self.description = description.clone();
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(completed) = patch.completed {
            if completed != self.completed && patch.completed_at.is_none() {
                self.completed_at = completed.then_some(now);
            }
            self.completed = completed;
        }
        if let Some(completed_at) = patch.completed_at {
            self.completed_at = completed_at;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
    }

    /// Flips completion, setting or clearing `completed_at` in lockstep.
    pub fn toggled(&self, now: EpochMillis) -> TaskPatch {
        let completed = !self.completed;
        TaskPatch {
            completed: Some(completed),
            completed_at: Some(completed.then_some(now)),
            ..TaskPatch::default()
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("title", &self.title)?;
        if self.completed != self.completed_at.is_some() {
            return Err(ModelValidationError::CompletionMismatch {
                completed: self.completed,
            });
        }
        Ok(())
    }
}
