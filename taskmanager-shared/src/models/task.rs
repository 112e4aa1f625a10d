/// Task model, inputs and list queries
///
/// Every task has exactly one owner, fixed at creation. Nothing in this module
/// lets a request payload choose or change the owner: [`NewTask`] has no owner
/// field and [`TaskPatch`] rejects unknown keys.
///
/// # State Machine
///
/// ```text
/// Active (completed = false) ⇄ Done (completed = true)
/// Active | Done → Deleted
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY,
///     owner UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name TEXT NOT NULL,
///     description VARCHAR(50) NOT NULL,
///     notes TEXT NOT NULL DEFAULT '',
///     priority TEXT NOT NULL DEFAULT 'Low',
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ServiceError, ServiceResult};

/// Fields a task may change through an update
pub const TASK_UPDATABLE_FIELDS: &[&str] = &["name", "description", "notes", "priority", "completed"];

/// Priority assigned when none is given
pub const DEFAULT_PRIORITY: &str = "Low";

/// Task lifecycle state derived from the `completed` flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Active,
    Done,
}

/// A user's task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub notes: String,
    pub priority: String,
    pub completed: bool,

    /// Owning user, immutable
    pub owner: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn status(&self) -> TaskStatus {
        if self.completed {
            TaskStatus::Done
        } else {
            TaskStatus::Active
        }
    }
}

fn default_priority() -> String {
    DEFAULT_PRIORITY.to_string()
}

/// Task creation payload
///
/// Unknown keys, including any `owner` or `id`, are ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewTask {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,

    #[validate(length(
        min = 1,
        max = 50,
        message = "The description is required and may be at most 50 characters."
    ))]
    pub description: String,

    #[serde(default)]
    pub notes: String,

    #[serde(default = "default_priority")]
    pub priority: String,

    #[serde(default)]
    pub completed: bool,
}

impl NewTask {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            notes: self.notes.trim().to_string(),
            priority: self.priority,
            completed: self.completed,
        }
    }
}

/// Task update payload; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TaskPatch {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: Option<String>,

    #[validate(length(
        min = 1,
        max = 50,
        message = "The description is required and may be at most 50 characters."
    ))]
    pub description: Option<String>,

    pub notes: Option<String>,
    pub priority: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|v| v.trim().to_string()),
            description: self.description.map(|v| v.trim().to_string()),
            notes: self.notes.map(|v| v.trim().to_string()),
            priority: self.priority,
            completed: self.completed,
        }
    }

    /// Writes every supplied field onto `task`
    pub fn apply_to(self, task: &mut Task) {
        if let Some(name) = self.name {
            task.name = name;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(notes) = self.notes {
            task.notes = notes;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

/// Store input for a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub owner: Uuid,
    pub name: String,
    pub description: String,
    pub notes: String,
    pub priority: String,
    pub completed: bool,
}

impl CreateTask {
    pub fn from_new(owner: Uuid, task: NewTask) -> Self {
        Self {
            owner,
            name: task.name,
            description: task.description,
            notes: task.notes,
            priority: task.priority,
            completed: task.completed,
        }
    }
}

/// Fields a task list can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortKey {
    CreatedAt,
    UpdatedAt,
    Name,
    Description,
    Priority,
    Completed,
}

impl TaskSortKey {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "created_at" | "createdAt" => Some(TaskSortKey::CreatedAt),
            "updated_at" | "updatedAt" => Some(TaskSortKey::UpdatedAt),
            "name" => Some(TaskSortKey::Name),
            "description" => Some(TaskSortKey::Description),
            "priority" => Some(TaskSortKey::Priority),
            "completed" => Some(TaskSortKey::Completed),
            _ => None,
        }
    }

    /// Column name in the `tasks` table
    pub fn column(&self) -> &'static str {
        match self {
            TaskSortKey::CreatedAt => "created_at",
            TaskSortKey::UpdatedAt => "updated_at",
            TaskSortKey::Name => "name",
            TaskSortKey::Description => "description",
            TaskSortKey::Priority => "priority",
            TaskSortKey::Completed => "completed",
        }
    }

    /// Compares two tasks on this key alone
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        match self {
            TaskSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            TaskSortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            TaskSortKey::Name => a.name.cmp(&b.name),
            TaskSortKey::Description => a.description.cmp(&b.description),
            TaskSortKey::Priority => a.priority.cmp(&b.priority),
            TaskSortKey::Completed => a.completed.cmp(&b.completed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub key: TaskSortKey,
    pub direction: SortDirection,
}

impl TaskSort {
    /// Parses `field` or `field:direction`
    ///
    /// Only `desc` selects descending order; any other direction is ascending.
    pub fn parse(raw: &str) -> ServiceResult<Self> {
        let mut parts = raw.splitn(2, ':');
        let field = parts.next().unwrap_or_default();
        let direction = match parts.next() {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };

        let key = TaskSortKey::parse(field)
            .ok_or_else(|| ServiceError::invalid("sortBy", format!("Cannot sort by '{}'", field)))?;

        Ok(Self { key, direction })
    }
}

/// Raw list parameters as they arrive in the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTasksParams {
    pub completed: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

/// Validated list query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub completed: Option<bool>,
    pub sort: Option<TaskSort>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

impl TryFrom<ListTasksParams> for TaskQuery {
    type Error = ServiceError;

    fn try_from(params: ListTasksParams) -> ServiceResult<Self> {
        let sort = params.sort_by.as_deref().map(TaskSort::parse).transpose()?;

        if params.limit.is_some_and(|l| l < 0) {
            return Err(ServiceError::invalid("limit", "limit must not be negative"));
        }
        if params.skip.is_some_and(|s| s < 0) {
            return Err(ServiceError::invalid("skip", "skip must not be negative"));
        }

        Ok(Self {
            // An empty `completed=` applies no filter
            completed: params.completed.filter(|c| !c.is_empty()).map(|c| c == "true"),
            sort,
            // limit=0 means no limit
            limit: params.limit.filter(|l| *l > 0),
            skip: params.skip.filter(|s| *s > 0),
        })
    }
}
