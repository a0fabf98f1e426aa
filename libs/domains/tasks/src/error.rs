use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

use crate::form::FormErrors;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task not found: {0}")]
    NotFound(i32),

    #[error("Invalid task form: {0}")]
    Validation(FormErrors),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub type TaskResult<T> = Result<T, TaskError>;

/// Convert TaskError to AppError for standardized error responses
impl From<TaskError> for AppError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(id) => AppError::NotFound(format!("No task with id {}", id)),
            TaskError::Validation(errors) => {
                AppError::Validation(serde_json::to_value(errors).unwrap_or_default())
            }
            TaskError::Database(err) => AppError::Database(err),
        }
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
