use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::task::Task;

/// A user aggregate: the account together with its embedded tasks and subtasks.
///
/// The aggregate is loaded and saved as one unit. `version` is the optimistic concurrency
/// token; stores refuse to save an aggregate whose version is no longer current.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Always stored lowercased.
    pub email: String,
    pub password_hash: String,
    pub tasks: Vec<Task>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a user. The password arrives here already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// The public part of a user, as returned by registration. Never carries the hash.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl User {
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }

    pub fn find_task(&self, key: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|task| task.matches(key))
    }

    /// Mutable lookup of a task that is still live. Soft-deleted tasks are invisible here.
    pub fn find_active_task_mut(&mut self, key: Uuid) -> Option<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| task.matches(key) && !task.is_deleted)
    }

    /// Live tasks in insertion order, each with its deleted subtasks hidden.
    pub fn active_tasks(&self) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| !task.is_deleted)
            .map(Task::active_view)
            .collect()
    }
}
