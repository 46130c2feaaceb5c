use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::TaskStatus;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Due date {due_date} is before today ({today})")]
    InvalidDueDate { due_date: NaiveDate, today: NaiveDate },

    #[error(
        "Status cannot be changed from {current} to {requested} by an update; use the complete or pending operations"
    )]
    IllegalStatusChange {
        current: TaskStatus,
        requested: TaskStatus,
    },

    #[error("Task is already {0}")]
    AlreadyInState(TaskStatus),

    #[error("Task not found: {0}")]
    NotFound(Uuid),

    #[error("Not allowed to access task {0}")]
    Forbidden(Uuid),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TaskResult<T> = Result<T, TaskError>;

impl TaskError {
    pub fn validation(msg: impl Into<String>) -> Self {
        TaskError::Validation(msg.into())
    }
}

/// Convert TaskError to AppError for standardized error responses
impl From<TaskError> for AppError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::Validation(msg) => AppError::BadRequest(msg),
            TaskError::InvalidDueDate { .. }
            | TaskError::IllegalStatusChange { .. }
            | TaskError::AlreadyInState(_) => AppError::BadRequest(err.to_string()),
            TaskError::NotFound(_) => AppError::NotFound(err.to_string()),
            TaskError::Forbidden(_) => AppError::Forbidden(err.to_string()),
            TaskError::Database(msg) => {
                AppError::InternalServerError(format!("Database error: {}", msg))
            }
            TaskError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<sea_orm::DbErr> for TaskError {
    fn from(err: sea_orm::DbErr) -> Self {
        TaskError::Database(err.to_string())
    }
}
