//! OpenAPI documentation.
//!
//! [`ApiDoc`] collects every route and schema; [`openapi`] stamps the configured public
//! base URL into the `servers` list. The document is served at `/api-docs/openapi.json` and
//! rendered by Swagger UI under `/api-docs/`.

use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::server::Server;
use utoipa::{Modify, OpenApi, ToSchema};

use crate::auth::{LoginRequest, LoginResponse, LoginUser, RegisterRequest};
use crate::models::{
    CreateTaskInput, PublicUser, ReplaceSubtasksInput, Subtask, SubtaskInput, Task, TaskStatus,
    UpdateTaskInput,
};
use crate::routes::health::HealthResponse;
use crate::routes::tasks::MessageResponse;

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Registers the bearer token scheme referenced by the task routes.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&BearerAuth),
    info(
        title = "Taskledger API",
        description = "Per-user tasks and subtasks with soft deletion, behind bearer-token auth."
    ),
    paths(
        crate::routes::users::register,
        crate::routes::users::login,
        crate::routes::tasks::get_tasks,
        crate::routes::tasks::create_task,
        crate::routes::tasks::update_task,
        crate::routes::tasks::delete_task,
        crate::routes::tasks::get_subtasks,
        crate::routes::tasks::update_subtasks,
        crate::routes::health::health,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        LoginUser,
        PublicUser,
        Task,
        Subtask,
        TaskStatus,
        CreateTaskInput,
        SubtaskInput,
        UpdateTaskInput,
        ReplaceSubtasksInput,
        MessageResponse,
        HealthResponse,
        ErrorBody
    )),
    tags(
        (name = "users", description = "Registration and login"),
        (name = "tasks", description = "Task management"),
        (name = "subtasks", description = "Subtask management"),
        (name = "health", description = "Liveness probe")
    )
)]
pub struct ApiDoc;

/// The OpenAPI document with `base_url` as its only server.
pub fn openapi(base_url: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.servers = Some(vec![Server::new(base_url)]);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = openapi("https://tasks.example.com");
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/users/register",
            "/api/users/login",
            "/api/tasks",
            "/api/tasks/{task_id}",
            "/api/tasks/{task_id}/subtasks",
            "/health",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected}"
            );
        }

        let servers = doc.servers.unwrap();
        assert_eq!(servers[0].url, "https://tasks.example.com");
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
