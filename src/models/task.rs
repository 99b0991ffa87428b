use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::date::parse_strict_date;

/// Progress of a task or subtask.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, ToSchema)]
pub enum TaskStatus {
    /// Not started yet. Assigned when the client omits a status.
    #[default]
    #[serde(rename = "pending")]
    Pending,
    /// Being worked on.
    #[serde(rename = "in progress", alias = "In progress")]
    InProgress,
    /// Finished.
    #[serde(rename = "completed")]
    Completed,
}

/// A subtask embedded inside a [`Task`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Secondary identifier kept alongside `_id` for older clients.
    #[serde(rename = "subtask_id")]
    pub subtask_id: Uuid,
    pub subject: String,
    /// Deadline, stored as UTC midnight of the submitted day.
    pub last_date: DateTime<Utc>,
    pub status: TaskStatus,
    pub is_deleted: bool,
}

/// A task embedded inside a user aggregate.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Secondary identifier kept alongside `_id` for older clients; lookups accept either.
    #[serde(rename = "task_id")]
    pub task_id: Uuid,
    pub subject: String,
    /// Deadline, stored as UTC midnight of the submitted day.
    pub last_date: DateTime<Utc>,
    pub status: TaskStatus,
    pub is_deleted: bool,
    pub subtasks: Vec<Subtask>,
}

/// Input for a single subtask, used both inline at task creation and for bulk replacement.
#[derive(Debug, Serialize, Deserialize, Clone, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubtaskInput {
    #[validate(length(min = 1, message = "Subtask subject is required"))]
    pub subject: String,
    /// Deadline in `DD/MM/YYYY`.
    #[schema(example = "24/12/2026")]
    pub last_date: String,
    pub status: Option<TaskStatus>,
}

/// Request body of `POST /api/tasks`.
#[derive(Debug, Serialize, Deserialize, Clone, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskInput {
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,
    /// Deadline in `DD/MM/YYYY`.
    #[schema(example = "24/12/2026")]
    pub last_date: String,
    pub status: Option<TaskStatus>,
    pub subtasks: Option<Vec<SubtaskInput>>,
}

/// Request body of `PUT /api/tasks/{task_id}`. Absent fields are left untouched.
#[derive(Debug, Serialize, Deserialize, Clone, Default, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskInput {
    #[validate(length(min = 1, message = "Subject must not be empty"))]
    pub subject: Option<String>,
    /// Deadline in `DD/MM/YYYY`.
    #[schema(example = "31/12/2026")]
    pub last_date: Option<String>,
    pub status: Option<TaskStatus>,
}

/// Request body of `PUT /api/tasks/{task_id}/subtasks`.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct ReplaceSubtasksInput {
    pub subtasks: Vec<SubtaskInput>,
}

impl Subtask {
    /// Validates the input and builds a fresh, live subtask with new identifiers.
    pub fn from_input(input: &SubtaskInput) -> Result<Self, AppError> {
        input.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            subtask_id: Uuid::new_v4(),
            subject: input.subject.clone(),
            last_date: parse_strict_date(&input.last_date)?,
            status: input.status.unwrap_or_default(),
            is_deleted: false,
        })
    }
}

impl Task {
    /// Validates the input, including every inline subtask, and builds a new task.
    ///
    /// A single bad subtask fails the whole construction; nothing partial is returned.
    pub fn from_input(input: &CreateTaskInput) -> Result<Self, AppError> {
        input.validate()?;
        let last_date = parse_strict_date(&input.last_date)?;
        let subtasks = input
            .subtasks
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(Subtask::from_input)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            subject: input.subject.clone(),
            last_date,
            status: input.status.unwrap_or_default(),
            is_deleted: false,
            subtasks,
        })
    }

    /// True when `key` is either the primary or the legacy identifier of this task.
    pub fn matches(&self, key: Uuid) -> bool {
        self.id == key || self.task_id == key
    }

    /// Subtasks that have not been soft-deleted, in insertion order.
    pub fn active_subtasks(&self) -> Vec<Subtask> {
        self.subtasks
            .iter()
            .filter(|subtask| !subtask.is_deleted)
            .cloned()
            .collect()
    }

    /// The client-facing view of this task: same fields, deleted subtasks hidden.
    pub fn active_view(&self) -> Task {
        Task {
            subtasks: self.active_subtasks(),
            ..self.clone()
        }
    }
}
