use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::error::ErrorKind;
use thiserror::Error;
use tracing::{error, warn};

/// Generic retry message shown for faults the client cannot act on.
pub const RETRY_MESSAGE: &str = "Es ist ein Fehler aufgetreten. Bitte versuchen Sie es erneut.";

/// One error taxonomy for every store and handler. Absence on read paths is
/// `Ok(None)`, never an error; `NotFound` is reserved for targeted mutations
/// and id lookups the handler turns into 404.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,
    #[error("constraint violation: {0}")]
    Constraint(String),
    #[error("database error: {0}")]
    Connectivity(#[source] sqlx::Error),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound,
            sqlx::Error::Database(db) => match db.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => AppError::Constraint(db.to_string()),
                _ => AppError::Connectivity(sqlx::Error::Database(db)),
            },
            other => AppError::Connectivity(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
            AppError::Constraint(detail) => {
                warn!(detail = %detail, "constraint violation");
                (StatusCode::CONFLICT, RETRY_MESSAGE.to_string())
            }
            AppError::Connectivity(e) => {
                error!(error = %e, "database unreachable or query failed");
                (StatusCode::INTERNAL_SERVER_ERROR, RETRY_MESSAGE.to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Internal(detail) => {
                error!(detail = %detail, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, RETRY_MESSAGE.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
