use crate::{
    auth::AuthenticatedUser,
    docs::ErrorBody,
    error::AppError,
    models::{CreateTaskInput, ReplaceSubtasksInput, Subtask, Task, UpdateTaskInput},
    services::TaskService,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Confirmation body for deletions.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Lists the authenticated user's tasks.
///
/// Soft-deleted tasks are left out, and so are soft-deleted subtasks of the tasks that
/// remain. Tasks come back in the order they were created.
#[utoipa::path(
    get,
    path = "/api/tasks",
    responses(
        (status = 200, description = "Live tasks", body = [Task]),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
#[get("")]
pub async fn get_tasks(
    tasks: web::Data<TaskService>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let list = tasks
        .get_user_tasks(user.id())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(HttpResponse::Ok().json(list))
}

/// Creates a task for the authenticated user.
///
/// ## Request Body:
/// - `subject`: required, non-empty.
/// - `lastDate`: required, `DD/MM/YYYY`.
/// - `status` (optional): `pending` (default), `in progress` or `completed`.
/// - `subtasks` (optional): inline subtasks with the same fields. One bad subtask
///   rejects the whole request.
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskInput,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Missing fields or bad date format", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
#[post("")]
pub async fn create_task(
    tasks: web::Data<TaskService>,
    user: AuthenticatedUser,
    task_data: web::Json<CreateTaskInput>,
) -> Result<impl Responder, AppError> {
    let task = tasks
        .add_task(user.id(), task_data.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(HttpResponse::Created().json(task))
}

/// Partially updates a task. Only `subject`, `lastDate` and `status` present in the body
/// are applied.
#[utoipa::path(
    put,
    path = "/api/tasks/{task_id}",
    params(("task_id" = String, Path, description = "Task `_id` or legacy `task_id`")),
    request_body = UpdateTaskInput,
    responses(
        (status = 200, description = "Updated task", body = Task),
        (status = 400, description = "Invalid field or bad date format", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "Task not found or already deleted", body = ErrorBody),
        (status = 409, description = "Concurrent modification", body = ErrorBody)
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
#[put("/{task_id}")]
pub async fn update_task(
    tasks: web::Data<TaskService>,
    user: AuthenticatedUser,
    task_id: web::Path<String>,
    task_data: web::Json<UpdateTaskInput>,
) -> Result<impl Responder, AppError> {
    let task = tasks
        .update_task(user.id(), &task_id, task_data.into_inner())
        .await?
        .ok_or_else(AppError::task_not_found)?;
    Ok(HttpResponse::Ok().json(task))
}

/// Soft-deletes a task. A task that is already deleted is reported as not found.
#[utoipa::path(
    delete,
    path = "/api/tasks/{task_id}",
    params(("task_id" = String, Path, description = "Task `_id` or legacy `task_id`")),
    responses(
        (status = 200, description = "Task deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "Task not found or already deleted", body = ErrorBody),
        (status = 409, description = "Concurrent modification", body = ErrorBody)
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
#[delete("/{task_id}")]
pub async fn delete_task(
    tasks: web::Data<TaskService>,
    user: AuthenticatedUser,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    tasks
        .delete_task(user.id(), &task_id)
        .await?
        .ok_or_else(AppError::task_not_found)?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/tasks/{task_id}/subtasks",
    params(("task_id" = String, Path, description = "Task `_id` or legacy `task_id`")),
    responses(
        (status = 200, description = "Live subtasks", body = [Subtask]),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "Task not found", body = ErrorBody)
    ),
    tag = "subtasks",
    security(("bearer_auth" = []))
)]
#[get("/{task_id}/subtasks")]
pub async fn get_subtasks(
    tasks: web::Data<TaskService>,
    user: AuthenticatedUser,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let subtasks = tasks
        .get_subtasks(user.id(), &task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    Ok(HttpResponse::Ok().json(subtasks))
}

/// Replaces the live subtasks of a task.
///
/// Previously deleted subtasks are kept after the new ones; the response lists only the
/// live subtasks.
#[utoipa::path(
    put,
    path = "/api/tasks/{task_id}/subtasks",
    params(("task_id" = String, Path, description = "Task `_id` or legacy `task_id`")),
    request_body = ReplaceSubtasksInput,
    responses(
        (status = 200, description = "Live subtasks after replacement", body = [Subtask]),
        (status = 400, description = "Missing list or bad date format", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "Task not found", body = ErrorBody),
        (status = 409, description = "Concurrent modification", body = ErrorBody)
    ),
    tag = "subtasks",
    security(("bearer_auth" = []))
)]
#[put("/{task_id}/subtasks")]
pub async fn update_subtasks(
    tasks: web::Data<TaskService>,
    user: AuthenticatedUser,
    task_id: web::Path<String>,
    body: web::Json<ReplaceSubtasksInput>,
) -> Result<impl Responder, AppError> {
    let subtasks = tasks
        .update_subtasks(user.id(), &task_id, body.into_inner().subtasks)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    Ok(HttpResponse::Ok().json(subtasks))
}
