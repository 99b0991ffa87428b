pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::auth::AuthMiddleware;

/// Mounts the `/users` and `/tasks` scopes. Every task route sits behind `auth`.
pub fn config(cfg: &mut web::ServiceConfig, auth: AuthMiddleware) {
    cfg.service(
        web::scope("/users")
            .service(users::register)
            .service(users::login),
    )
    .service(
        web::scope("/tasks")
            .wrap(auth)
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::update_task)
            .service(tasks::delete_task)
            .service(tasks::get_subtasks)
            .service(tasks::update_subtasks),
    );
}
