pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use token::{Claims, TokenService, TokenUser};

lazy_static! {
    // Display names: letters and spaces only.
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[A-Za-z ]+$").unwrap();
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Display name. Letters and spaces only.
    #[validate(
        length(min = 1, max = 50),
        custom = "not_blank",
        regex(
            path = "USERNAME_REGEX",
            message = "Username may only contain letters and spaces"
        )
    )]
    pub username: String,
    #[validate(email)]
    pub email: String,
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
}

// The name is stored trimmed, so all-space input counts as missing.
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Username is required".into());
        return Err(error);
    }
    Ok(())
}

/// The user block of a successful login, carrying the bearer token.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub access_token: String,
}

/// Response body of `POST /api/users/login`.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct LoginResponse {
    pub user: LoginUser,
}
