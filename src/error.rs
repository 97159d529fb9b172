//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the error type every HTTP handler returns.
//! `AppError` implements `actix_web::error::ResponseError`, so a handler can use
//! `?` and still produce a stable status code with a `{ "message": ... }` JSON body.
//!
//! Internal details (database errors, signing failures, store outages) are logged
//! server side and replaced by a generic message before they reach a client.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use log::error;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::AuthError;
use crate::store::StoreError;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed or is required but missing (HTTP 401).
    Unauthorized(String),
    /// Malformed or invalid request (HTTP 400).
    BadRequest(String),
    /// A requested resource was not found (HTTP 404).
    NotFound(String),
    /// The request collides with existing state, e.g. a duplicate email (HTTP 409).
    Conflict(String),
    /// Unexpected server-side error (HTTP 500). The message is logged, not sent.
    InternalServerError(String),
    /// Error originating from database operations (HTTP 500). The message is logged, not sent.
    DatabaseError(String),
    /// Input failed validation (HTTP 422 Unprocessable Entity).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::ValidationError(msg) => msg.as_str(),
            AppError::InternalServerError(msg) | AppError::DatabaseError(msg) => {
                error!("{}", msg);
                INTERNAL_MESSAGE
            }
        };
        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

/// `RowNotFound` becomes `NotFound`; everything else is a `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::Conflict(msg) => AppError::Conflict(msg.into()),
            StoreError::Database(e) => AppError::from(e),
        }
    }
}

/// Maps the authentication taxonomy onto stable statuses and short messages.
///
/// The reason carried by `Unauthenticated` and `SigningError` is only logged.
impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        match error {
            AuthError::NotFound => AppError::NotFound("User not found".into()),
            AuthError::InactiveAccount => AppError::Unauthorized("User is inactive".into()),
            AuthError::InvalidCredentials => AppError::Unauthorized("Invalid password".into()),
            AuthError::Unauthenticated(reason) => {
                log::debug!("request rejected: {}", reason);
                AppError::Unauthorized("Unauthorized".into())
            }
            AuthError::SigningError(reason) => {
                AppError::InternalServerError(format!("token signing failed: {}", reason))
            }
            AuthError::StoreUnavailable(reason) => {
                AppError::DatabaseError(format!("user store unavailable: {}", reason))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_message(error: AppError) -> (StatusCode, String) {
        let response = error.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json["message"].as_str().unwrap().to_string())
    }

    #[test]
    fn test_error_responses() {
        let error = AppError::Unauthorized("Invalid token".into());
        assert_eq!(error.error_response().status(), 401);

        let error = AppError::BadRequest("Invalid input".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::NotFound("Resource not found".into());
        assert_eq!(error.error_response().status(), 404);

        let error = AppError::Conflict("Email already exists".into());
        assert_eq!(error.error_response().status(), 409);

        let error = AppError::InternalServerError("Server error".into());
        assert_eq!(error.error_response().status(), 500);

        let error = AppError::ValidationError("name: too short".into());
        assert_eq!(error.error_response().status(), 422);
    }

    #[actix_rt::test]
    async fn test_internal_details_are_not_sent() {
        let (status, message) =
            body_message(AppError::DatabaseError("relation \"users\" does not exist".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, INTERNAL_MESSAGE);
    }

    #[actix_rt::test]
    async fn test_auth_errors_map_to_stable_messages() {
        let cases = vec![
            (AuthError::NotFound, StatusCode::NOT_FOUND, "User not found"),
            (AuthError::InactiveAccount, StatusCode::UNAUTHORIZED, "User is inactive"),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED, "Invalid password"),
            (
                AuthError::Unauthenticated("ExpiredSignature".into()),
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
            ),
            (
                AuthError::SigningError("InvalidKeyFormat".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_MESSAGE,
            ),
        ];

        for (auth_error, expected_status, expected_message) in cases {
            let (status, message) = body_message(AppError::from(auth_error)).await;
            assert_eq!(status, expected_status);
            assert_eq!(message, expected_message);
        }
    }
}
