// src/errors.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    // Calendar errors
    #[error("Invalid fiscal month: {0} (expected 1-12)")]
    InvalidFiscalMonth(u32),

    // Persistence errors
    #[error("Persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Whether the failed operation may succeed if simply run again.
    /// Rollover re-checks existence before creating, so retrying is safe.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Persistence(e) => match e {
                sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::PoolClosed => true,
                sqlx::Error::Database(db) => matches!(
                    db.code().as_deref(),
                    // unique_violation, serialization_failure, deadlock_detected, lock_not_available
                    Some("23505") | Some("40001") | Some("40P01") | Some("55P03")
                ),
                _ => false,
            },
            _ => false,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidFiscalMonth(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Persistence(_) if self.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

// Convenience alias
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_month_maps_to_bad_request() {
        let err = AppError::InvalidFiscalMonth(13);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid fiscal month: 13 (expected 1-12)");
    }

    #[test]
    fn pool_timeout_is_retryable_and_unavailable() {
        let err = AppError::Persistence(sqlx::Error::PoolTimedOut);
        assert!(err.is_retryable());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn missing_row_is_not_retryable() {
        let err = AppError::Persistence(sqlx::Error::RowNotFound);
        assert!(!err.is_retryable());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!AppError::NotFound("x".into()).is_retryable());
    }
}
