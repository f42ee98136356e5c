//! Typed errors and HTTP mapping.

use crate::response::{Envelope, Message};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// SQLSTATE raised by Postgres for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("bootstrap: {0}")]
    Bootstrap(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    NotFound(String),
    #[error("ClassName not found")]
    ClassNotFound(String),
    #[error("Role not found")]
    RoleNotFound(i64),
    #[error("Student code already exists: {0}")]
    DuplicateCode(String),
    #[error("Email already exists: {0}")]
    DuplicateEmail(String),
    #[error("Email belongs to another student")]
    EmailTaken,
    #[error("{0}")]
    BadRequest(String),
    /// A request the framework refused before any handler logic ran
    /// (unsupported media type, oversized body); the status is kept.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    /// Field-level violations, in the order the fields are declared.
    #[error("validation: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("{0}")]
    ProcedureFailed(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("{0}")]
    Unexpected(String),
}

/// HTTP status and envelope `error` label for a failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub status: StatusCode,
    pub label: &'static str,
}

impl Classification {
    const fn new(status: StatusCode, label: &'static str) -> Self {
        Classification { status, label }
    }
}

pub fn classify(err: &AppError) -> Classification {
    match err {
        AppError::NotFound(_) | AppError::ClassNotFound(_) | AppError::RoleNotFound(_) => {
            Classification::new(StatusCode::NOT_FOUND, "Resource Not Found")
        }
        AppError::DuplicateCode(_) | AppError::DuplicateEmail(_) | AppError::EmailTaken => {
            Classification::new(StatusCode::CONFLICT, "Conflict")
        }
        AppError::BadRequest(_) => Classification::new(StatusCode::BAD_REQUEST, "Data invalid!"),
        AppError::Rejected { status, .. } => Classification::new(*status, "Data invalid!"),
        AppError::Validation(_) => Classification::new(StatusCode::BAD_REQUEST, "Validation Error"),
        AppError::ProcedureFailed(_) => Classification::new(StatusCode::BAD_REQUEST, "Operation Failed"),
        AppError::Db(sqlx::Error::RowNotFound) => {
            Classification::new(StatusCode::NOT_FOUND, "Resource Not Found")
        }
        AppError::Db(e) if is_unique_violation(e) => Classification::new(StatusCode::CONFLICT, "Conflict"),
        AppError::Db(_) => Classification::new(StatusCode::INTERNAL_SERVER_ERROR, "Database Operation Failed"),
        AppError::Config(_) | AppError::Unexpected(_) => {
            Classification::new(StatusCode::INTERNAL_SERVER_ERROR, "Unexpected Error")
        }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

impl AppError {
    /// Client-facing message. Database and configuration failures never expose driver text.
    pub fn client_message(&self) -> Message {
        match self {
            AppError::Validation(messages) => Message::from_list(messages.clone()),
            AppError::Db(sqlx::Error::RowNotFound) => Message::Text("Resource not found".into()),
            AppError::Db(e) if is_unique_violation(e) => {
                Message::Text("Student code or email already exists".into())
            }
            AppError::Db(_) => Message::Text("An error occurred while accessing the database".into()),
            AppError::Config(_) => Message::Text("Server misconfiguration".into()),
            other => Message::Text(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let Classification { status, label } = classify(&self);
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "request rejected");
        }
        Envelope::failure(status, label, self.client_message()).into_response()
    }
}
