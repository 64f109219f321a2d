//!
//! # Custom Error Handling
//!
//! This module defines the error type `AppError` used by every handler and by the
//! authentication middleware. Each variant maps to exactly one HTTP status and a
//! JSON body of the shape `{"error": "..."}`.
//!
//! Two variants deliberately carry no detail: `Unauthorized` and `InvalidCredentials`.
//! Callers never learn whether a token was missing, badly signed, expired or pointed
//! at an unknown user, nor whether it was the email or the password that did not match.
//! `InternalServerError` keeps its detail for the log and returns a generic body.

use actix_web::{error::BlockingError, error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::store::StoreError;

/// Generic body returned for every authentication failure.
pub const AUTHENTICATION_FAILED: &str = "Authentication failed";
/// Generic body returned when the caller does not own the referenced resource.
pub const AUTHORIZATION_FAILED: &str = "Authorization failed";
/// Shared message for unknown email and wrong password.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
/// Body of every 500 response.
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// Represents all errors a request can end with.
#[derive(Debug)]
pub enum AppError {
    /// Malformed request, e.g. an unparsable JSON body or sort specification (HTTP 400).
    BadRequest(String),
    /// Input that parsed but failed validation (HTTP 400).
    ValidationError(String),
    /// Login failed. Unknown email and wrong password are not distinguished (HTTP 400).
    InvalidCredentials,
    /// Missing, malformed, badly signed or expired token, or a token for an unknown user (HTTP 401).
    Unauthorized,
    /// Authenticated caller is not the owner named by the request (HTTP 403).
    Forbidden,
    /// Resource is absent or owned by someone else (HTTP 404).
    NotFound(String),
    /// Unexpected fault. The message is logged, never sent (HTTP 500).
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::InvalidCredentials => write!(f, "Invalid Credentials"),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl AppError {
    /// The message placed in the `error` field of the response body.
    pub fn public_message(&self) -> &str {
        match self {
            AppError::BadRequest(msg) | AppError::ValidationError(msg) | AppError::NotFound(msg) => {
                msg
            }
            AppError::InvalidCredentials => INVALID_CREDENTIALS,
            AppError::Unauthorized => AUTHENTICATION_FAILED,
            AppError::Forbidden => AUTHORIZATION_FAILED,
            AppError::InternalServerError(_) => INTERNAL_SERVER_ERROR,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::ValidationError(_) | AppError::InvalidCredentials => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::InternalServerError(detail) = self {
            log::error!("internal error: {}", detail);
        }
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.public_message()
        }))
    }
}

/// Conflicts and constraint violations reported by a store are the caller's fault;
/// anything else is a backend fault and stays internal.
impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::Conflict(msg) => AppError::BadRequest(msg),
            StoreError::Validation(msg) => AppError::ValidationError(msg),
            StoreError::Backend(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("password hashing failed: {}", error))
    }
}

impl From<BlockingError> for AppError {
    fn from(error: BlockingError) -> AppError {
        AppError::InternalServerError(format!("blocking task failed: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(error: AppError) -> serde_json::Value {
        let body = to_bytes(error.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(AppError::BadRequest("x".into()).error_response().status(), 400);
        assert_eq!(AppError::ValidationError("x".into()).error_response().status(), 400);
        assert_eq!(AppError::InvalidCredentials.error_response().status(), 400);
        assert_eq!(AppError::Unauthorized.error_response().status(), 401);
        assert_eq!(AppError::Forbidden.error_response().status(), 403);
        assert_eq!(AppError::NotFound("x".into()).error_response().status(), 404);
        assert_eq!(
            AppError::InternalServerError("x".into()).error_response().status(),
            500
        );
    }

    #[actix_rt::test]
    async fn test_generic_bodies_hide_details() {
        assert_eq!(
            body_json(AppError::Unauthorized).await["error"],
            "Authentication failed"
        );
        assert_eq!(
            body_json(AppError::InvalidCredentials).await["error"],
            "Invalid email or password"
        );
        assert_eq!(
            body_json(AppError::InternalServerError("pool timed out".into())).await["error"],
            "Internal server error"
        );
    }

    #[actix_rt::test]
    async fn test_store_error_mapping() {
        let conflict: AppError = StoreError::Conflict("Email already registered".into()).into();
        assert_eq!(conflict.error_response().status(), 400);
        assert_eq!(body_json(conflict).await["error"], "Email already registered");

        let backend: AppError = StoreError::Backend("connection reset".into()).into();
        assert_eq!(backend.error_response().status(), 500);
    }
}
