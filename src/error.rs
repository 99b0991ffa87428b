//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a request can run into, from a malformed `lastDate` to a stale aggregate
//! write, ends up as one of its variants.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can return it
//! directly and have it rendered as `{"error": "..."}` with the matching status code.
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error` and `bcrypt::BcryptError` allow plain `?` propagation.
//!
//! "Not found" is deliberately absent from the service layer: services return
//! `Ok(None)` for a missing user or task and the route handlers turn that into
//! [`AppError::NotFound`].

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing or rejected credentials, or a missing/invalid/expired bearer token (HTTP 401).
    Unauthorized(String),
    /// A request body that is not JSON at all (HTTP 400).
    BadRequest(String),
    /// A required field is missing or a field violates its input schema (HTTP 400).
    ValidationError(String),
    /// A date string that is not a real calendar date in `DD/MM/YYYY` form (HTTP 400).
    InvalidDate(String),
    /// The email address is already registered (HTTP 400).
    Conflict(String),
    /// A requested user or task does not exist or is soft-deleted (HTTP 404).
    NotFound(String),
    /// The aggregate was modified by someone else between load and save (HTTP 409).
    WriteConflict(String),
    /// An unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// An error originating from the document store (HTTP 500).
    DatabaseError(String),
}

impl AppError {
    /// Shorthand for the uniform "not found" outcome of task lookups.
    pub fn task_not_found() -> Self {
        AppError::NotFound("Task not found or already deleted".into())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::InvalidDate(msg) => write!(f, "Invalid Date: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::WriteConflict(msg) => write!(f, "Write Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_)
            | AppError::ValidationError(_)
            | AppError::InvalidDate(_)
            | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::WriteConflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let msg = match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::ValidationError(msg)
            | AppError::InvalidDate(msg)
            | AppError::Conflict(msg)
            | AppError::NotFound(msg)
            | AppError::WriteConflict(msg)
            | AppError::InternalServerError(msg) => msg.as_str(),
            // Store internals stay in the log, not in the response body.
            AppError::DatabaseError(_) => "Database error",
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": msg }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// A unique-index violation can only come from the email column, so it is reported as
/// [`AppError::Conflict`]; everything else becomes [`AppError::DatabaseError`].
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        if let sqlx::Error::Database(db_err) = &error {
            if db_err.is_unique_violation() {
                return AppError::Conflict("User already exists".into());
            }
        }
        log::error!("Document store failure: {}", error);
        AppError::DatabaseError(error.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(format!("Invalid token: {:?}", error.kind()))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
