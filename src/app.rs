//! Application assembly shared by the binary and the integration tests.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    error::JsonPayloadError,
    middleware::Logger,
    web, App,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{AuthMiddleware, TokenService},
    config::Config,
    docs,
    error::AppError,
    routes,
    services::{TaskService, UserService},
    store::UserStore,
};

/// Everything a worker needs, built once at startup and cloned into each worker.
#[derive(Clone)]
pub struct AppState {
    pub users: web::Data<UserService>,
    pub tasks: web::Data<TaskService>,
    pub tokens: Arc<TokenService>,
    pub openapi: utoipa::openapi::OpenApi,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, config: &Config) -> Self {
        Self::with_tokens(store, TokenService::from_config(config), &config.base_url)
    }

    pub fn with_tokens(store: Arc<dyn UserStore>, tokens: TokenService, base_url: &str) -> Self {
        let tokens = Arc::new(tokens);
        Self {
            users: web::Data::new(UserService::new(Arc::clone(&store), Arc::clone(&tokens))),
            tasks: web::Data::new(TaskService::new(store)),
            tokens,
            openapi: docs::openapi(base_url),
        }
    }
}

/// Body that parsed as JSON but does not fit the input schema (missing fields, wrong
/// types, unknown status) is a validation failure; anything else is a bad request.
fn json_error(err: JsonPayloadError) -> AppError {
    match &err {
        JsonPayloadError::Deserialize(e) if e.is_data() => AppError::ValidationError(err.to_string()),
        _ => AppError::BadRequest(err.to_string()),
    }
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| json_error(err).into())
}

pub fn build_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let auth = AuthMiddleware::new(Arc::clone(&state.tokens));

    App::new()
        .app_data(json_config())
        .app_data(state.users.clone())
        .app_data(state.tasks.clone())
        .wrap(
            Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600),
        )
        .wrap(Logger::default())
        .service(routes::health::health)
        .service(SwaggerUi::new("/api-docs/{_:.*}").url("/api-docs/openapi.json", state.openapi))
        .service(web::scope("/api").configure(move |cfg| routes::config(cfg, auth)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_errors_split_by_cause() {
        let missing_field = serde_json::from_str::<crate::models::ReplaceSubtasksInput>("{}")
            .unwrap_err();
        assert!(matches!(
            json_error(JsonPayloadError::Deserialize(missing_field)),
            AppError::ValidationError(_)
        ));

        let not_json = serde_json::from_str::<serde_json::Value>("{subject:").unwrap_err();
        assert!(matches!(
            json_error(JsonPayloadError::Deserialize(not_json)),
            AppError::BadRequest(_)
        ));

        assert!(matches!(
            json_error(JsonPayloadError::ContentType),
            AppError::BadRequest(_)
        ));
    }
}
