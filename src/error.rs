use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::oauth::auth0::Auth0Error;
use crate::services::validation::ValidationError;

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Session error: {0}")]
    Session(String),

    #[error("Auth0 error: {0}")]
    Auth0(#[from] Auth0Error),

    #[error("CSRF token mismatch")]
    CsrfMismatch,

    #[error("Invalid request: {message}")]
    Rejected { status: StatusCode, message: String },
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl AppError {
    /// Maps a write failure, turning duplicate registrations into a conflict
    pub fn from_write(err: sqlx::Error) -> Self {
        let duplicate = err
            .as_database_error()
            .and_then(|db| db.code())
            .is_some_and(|code| code == UNIQUE_VIOLATION);

        if duplicate {
            AppError::Conflict(
                "A vehicle with this registration number already exists".to_string(),
            )
        } else {
            AppError::Database(err)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::CsrfMismatch => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Auth0(_) => StatusCode::BAD_GATEWAY,
            AppError::Rejected { status, .. } => *status,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                json!({ "error": "Database error", "message": e.to_string() })
            }
            AppError::Session(msg) => {
                tracing::error!(error = %msg, "Session error");
                json!({ "error": "Session error", "message": msg })
            }
            AppError::Auth0(e) => {
                tracing::warn!(error = %e, "Auth0 request failed");
                json!({ "error": "Authentication provider error", "message": e.to_string() })
            }
            AppError::Validation(e) => {
                json!({ "error": "Validation error", "message": e.to_string() })
            }
            AppError::Conflict(msg) => json!({ "error": "Conflict", "message": msg }),
            AppError::NotFound => json!({ "error": "Not found" }),
            AppError::Unauthorized => json!({ "error": "Unauthorized" }),
            AppError::CsrfMismatch => json!({ "error": "CSRF token mismatch" }),
            AppError::Rejected { message, .. } => {
                json!({ "error": "Invalid request", "message": message })
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;

    /// Minimal Postgres-style error carrying only a SQLSTATE
    #[derive(Debug)]
    struct SqlState(&'static str);

    impl std::fmt::Display for SqlState {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "sqlstate {}", self.0)
        }
    }

    impl std::error::Error for SqlState {}

    impl DatabaseError for SqlState {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.0 == UNIQUE_VIOLATION {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::Other
            }
        }
    }

    #[test]
    fn test_duplicate_registration_is_conflict() {
        let err = AppError::from_write(sqlx::Error::Database(Box::new(SqlState("23505"))));

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_other_database_error_is_not_conflict() {
        // foreign_key_violation
        let err = AppError::from_write(sqlx::Error::Database(Box::new(SqlState("23503"))));

        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Validation(ValidationError::MissingField("make")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Conflict("dup".to_string()).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_non_unique_write_error_stays_database() {
        assert!(matches!(
            AppError::from_write(sqlx::Error::RowNotFound),
            AppError::Database(_)
        ));
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
