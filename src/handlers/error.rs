use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::auth::PasswordError;
use crate::storage::StorageError;
use crate::validation::ValidationError;

/// Error body returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    /// Offending request field, for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Handler error mapped to a status code and an `ErrorResponse`
#[derive(Debug)]
pub enum ApiError {
    /// 422 - request field failed validation
    Validation(ValidationError),
    /// 400 - request conflicts with stored data
    BadRequest { message: String, code: &'static str },
    /// 401 - missing or wrong credentials
    Unauthorized(String),
    /// 403 - authenticated but not the owner
    Forbidden(String),
    /// 404 - referenced resource does not exist
    NotFound { message: String, code: &'static str },
    /// 429 - too many failed authentication attempts
    TooManyRequests,
    /// 500 - details are logged, never returned
    Internal(String),
}

impl ApiError {
    pub fn not_found(message: &str, code: &'static str) -> Self {
        ApiError::NotFound {
            message: message.to_string(),
            code,
        }
    }

    pub fn forbidden_for_company() -> Self {
        ApiError::Forbidden("operation not permitted for this company".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, code, field) = match self {
            ApiError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                err.message,
                "VALIDATION_ERROR",
                Some(err.field.to_string()),
            ),
            ApiError::BadRequest { message, code } => (StatusCode::BAD_REQUEST, message, code, None),
            ApiError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, message, "UNAUTHORIZED", None)
            }
            ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, message, "FORBIDDEN", None),
            ApiError::NotFound { message, code } => (StatusCode::NOT_FOUND, message, code, None),
            ApiError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many failed authentication attempts. Please try again later.".to_string(),
                "RATE_LIMITED",
                None,
            ),
            ApiError::Internal(details) => {
                error!("Internal error: {}", details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                    "INTERNAL_ERROR",
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            field,
        };
        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UserNotFound(_) | StorageError::UserEmailNotFound(_) => {
                ApiError::not_found("user not found", "USER_NOT_FOUND")
            }
            StorageError::SkillNotFound(_) => ApiError::not_found("skill not found", "SKILL_NOT_FOUND"),
            StorageError::JobNotFound(_) => ApiError::not_found("job not found", "JOB_NOT_FOUND"),
            StorageError::DuplicateEmail(_) => ApiError::BadRequest {
                message: "email already registered".to_string(),
                code: "EMAIL_TAKEN",
            },
            StorageError::DuplicateSkill(_) => ApiError::BadRequest {
                message: "skill already exists".to_string(),
                code: "SKILL_EXISTS",
            },
            err @ StorageError::MissingSkills(_) => ApiError::BadRequest {
                message: err.to_string(),
                code: "SKILLS_NOT_FOUND",
            },
            StorageError::Database(e) => ApiError::Internal(format!("Database error: {}", e)),
        }
    }
}
