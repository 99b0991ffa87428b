//! Task and subtask mutation.
//!
//! Every operation follows the same aggregate cycle: validate the input, load the
//! owner's document, change it in memory, save it whole. Input is validated before the
//! load so a bad date can never leave a half-applied change behind.
//!
//! `Ok(None)` is the uniform "not found" answer: unknown user, unknown task, or a task
//! that has been soft-deleted. Malformed input is an `Err`, so callers can tell a 400
//! from a 404 without looking at messages.

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{
    parse_strict_date, CreateTaskInput, Subtask, SubtaskInput, Task, UpdateTaskInput, User,
};
use crate::store::UserStore;

pub struct TaskService {
    store: Arc<dyn UserStore>,
}

/// Builds the new subtask list: `fresh` first, then every previously deleted subtask in
/// its existing order. Live subtasks that are not in `fresh` are dropped.
pub fn reconcile_subtasks(current: Vec<Subtask>, fresh: Vec<Subtask>) -> Vec<Subtask> {
    let deleted = current.into_iter().filter(|subtask| subtask.is_deleted);
    fresh.into_iter().chain(deleted).collect()
}

/// Parses a task key from the URL. Anything that is not a UUID cannot name a task.
fn parse_task_key(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

impl TaskService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    async fn load(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        self.store.find_by_id(user_id).await
    }

    /// Live tasks of the user, each with its live subtasks, in insertion order.
    pub async fn get_user_tasks(&self, user_id: Uuid) -> Result<Option<Vec<Task>>, AppError> {
        Ok(self.load(user_id).await?.map(|user| user.active_tasks()))
    }

    /// Appends a new task. Inline subtasks are validated with the same rules; one bad
    /// subtask rejects the whole task.
    pub async fn add_task(
        &self,
        user_id: Uuid,
        input: CreateTaskInput,
    ) -> Result<Option<Task>, AppError> {
        let task = Task::from_input(&input)?;
        let Some(mut user) = self.load(user_id).await? else {
            return Ok(None);
        };

        user.tasks.push(task.clone());
        self.store.save(&user).await?;
        log::info!("User {} created task {}", user_id, task.id);
        Ok(Some(task))
    }

    /// Applies the fields present in `updates` to a live task.
    pub async fn update_task(
        &self,
        user_id: Uuid,
        task_key: &str,
        updates: UpdateTaskInput,
    ) -> Result<Option<Task>, AppError> {
        updates.validate()?;
        let last_date = updates
            .last_date
            .as_deref()
            .map(parse_strict_date)
            .transpose()?;

        let Some(key) = parse_task_key(task_key) else {
            return Ok(None);
        };
        let Some(mut user) = self.load(user_id).await? else {
            return Ok(None);
        };
        let Some(task) = user.find_active_task_mut(key) else {
            return Ok(None);
        };

        if let Some(subject) = updates.subject {
            task.subject = subject;
        }
        if let Some(last_date) = last_date {
            task.last_date = last_date;
        }
        if let Some(status) = updates.status {
            task.status = status;
        }
        let updated = task.active_view();

        self.store.save(&user).await?;
        Ok(Some(updated))
    }

    /// Soft-deletes a live task. Deleting it a second time is "not found".
    pub async fn delete_task(
        &self,
        user_id: Uuid,
        task_key: &str,
    ) -> Result<Option<Task>, AppError> {
        let Some(key) = parse_task_key(task_key) else {
            return Ok(None);
        };
        let Some(mut user) = self.load(user_id).await? else {
            return Ok(None);
        };
        let Some(task) = user.find_active_task_mut(key) else {
            return Ok(None);
        };

        task.is_deleted = true;
        let deleted = task.clone();

        self.store.save(&user).await?;
        log::info!("User {} deleted task {}", user_id, deleted.id);
        Ok(Some(deleted))
    }

    /// Live subtasks of a live task, in insertion order.
    pub async fn get_subtasks(
        &self,
        user_id: Uuid,
        task_key: &str,
    ) -> Result<Option<Vec<Subtask>>, AppError> {
        let Some(key) = parse_task_key(task_key) else {
            return Ok(None);
        };
        let Some(user) = self.load(user_id).await? else {
            return Ok(None);
        };

        Ok(user
            .find_task(key)
            .filter(|task| !task.is_deleted)
            .map(Task::active_subtasks))
    }

    /// Replaces the live subtasks of a task while keeping the deleted ones.
    ///
    /// Every entry of `new_subtasks` is validated before anything is loaded. The stored list
    /// becomes the new subtasks followed by the previously deleted ones; the live part is
    /// returned.
    pub async fn update_subtasks(
        &self,
        user_id: Uuid,
        task_key: &str,
        new_subtasks: Vec<SubtaskInput>,
    ) -> Result<Option<Vec<Subtask>>, AppError> {
        let fresh = new_subtasks
            .iter()
            .map(Subtask::from_input)
            .collect::<Result<Vec<_>, _>>()?;

        let Some(key) = parse_task_key(task_key) else {
            return Ok(None);
        };
        let Some(mut user) = self.load(user_id).await? else {
            return Ok(None);
        };
        let Some(task) = user.find_active_task_mut(key) else {
            return Ok(None);
        };

        let current = std::mem::take(&mut task.subtasks);
        task.subtasks = reconcile_subtasks(current, fresh);
        let active = task.active_subtasks();
        let task_id = task.id;

        self.store.save(&user).await?;
        log::info!(
            "User {} replaced subtasks of task {} ({} live)",
            user_id,
            task_id,
            active.len()
        );
        Ok(Some(active))
    }
}
