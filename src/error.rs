// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// Conflicts and unhandled store errors surface as 400s with the underlying
/// message attached; auth failures are deliberately low-detail 401s.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },
    Conflict {
        message: String,
        detail: String,
    },
    Database(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_)
            | ApiError::Validation { .. }
            | ApiError::Conflict { .. }
            | ApiError::Database(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Validation { message, .. } => message,
            ApiError::Conflict { message, .. } => message,
            ApiError::Database(_) => "Database error",
            ApiError::Unauthorized(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::Database(_) => "DATABASE_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": self.message(),
            "code": self.error_code(),
        });

        match self {
            ApiError::Validation { field_errors, .. } => {
                body["field_errors"] = json!(field_errors);
            }
            ApiError::Conflict { detail, .. } => {
                body["detail"] = json!(detail);
            }
            ApiError::Database(detail) => {
                body["detail"] = json!(detail);
            }
            _ => {}
        }

        body
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        ApiError::Validation { message: message.into(), field_errors }
    }

    pub fn conflict(message: impl Into<String>, detail: impl Into<String>) -> Self {
        ApiError::Conflict { message: message.into(), detail: detail.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    /// Map a store error to `Conflict` when it is a unique-constraint
    /// violation, otherwise fall through to the generic store mapping.
    pub fn conflict_on_unique(err: sqlx::Error, message: &str) -> Self {
        if is_unique_violation(&err) {
            ApiError::conflict(message, err.to_string())
        } else {
            err.into()
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
        }
        _ => false,
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("store error: {}", err);
        ApiError::Database(err.to_string())
    }
}

impl From<crate::auth::AuthError> for ApiError {
    fn from(err: crate::auth::AuthError) -> Self {
        match err {
            crate::auth::AuthError::InvalidToken => {
                ApiError::unauthorized("Invalid or missing token")
            }
            crate::auth::AuthError::Hashing(msg) | crate::auth::AuthError::TokenGeneration(msg) => {
                tracing::error!("auth error: {}", msg);
                ApiError::internal("An error occurred while processing your request")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
