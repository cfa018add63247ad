use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::editor::session::SessionError;
use crate::editor::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotOpen(_) | SessionError::FailureNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            SessionError::Edit(e) => AppError::Validation(e.to_string()),
            SessionError::Store(e) => e.into(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ResumeNotFound(_)
            | StoreError::TemplateNotFound(_)
            | StoreError::EntryNotFound { .. } => AppError::NotFound(err.to_string()),
            StoreError::UnknownField { .. } | StoreError::InvalidValue { .. } => {
                AppError::Validation(err.to_string())
            }
            StoreError::Database(e) => AppError::Database(e),
            StoreError::Unavailable(msg) => AppError::Storage(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORAGE_ERROR",
                    "Storage is temporarily unavailable".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::EditError;
    use uuid::Uuid;

    #[test]
    fn test_session_errors_map_to_status() {
        let not_open: AppError = SessionError::NotOpen(Uuid::nil()).into();
        assert_eq!(not_open.into_response().status(), StatusCode::NOT_FOUND);

        let bad_edit: AppError =
            SessionError::Edit(EditError::UnknownSection("hobbies".to_string())).into();
        assert_eq!(bad_edit.into_response().status(), StatusCode::BAD_REQUEST);

        let missing: AppError = SessionError::Store(StoreError::ResumeNotFound(Uuid::nil())).into();
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let down: AppError = StoreError::Unavailable("pool closed".to_string()).into();
        assert_eq!(down.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
