use crate::{
    auth::{LoginRequest, LoginResponse, RegisterRequest},
    docs::ErrorBody,
    error::AppError,
    models::PublicUser,
    services::UserService,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Register a new user
///
/// Creates a new account and returns its public fields. The password is never echoed.
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = PublicUser),
        (status = 400, description = "Missing or invalid fields, or email already registered", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "users",
    security([])
)]
#[post("/register")]
pub async fn register(
    users: web::Data<UserService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let user = users.register(register_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Login user
///
/// Checks the credentials and returns a bearer token valid for 30 days.
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing fields", body = ErrorBody),
        (status = 401, description = "Email or password is not valid", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "users",
    security([])
)]
#[post("/login")]
pub async fn login(
    users: web::Data<UserService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let response = users.login(login_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
