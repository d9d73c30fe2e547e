use crate::models::Field;
use axum::{Json, http::StatusCode};
use serde_json::json;
use thiserror::Error;

pub const REQUIRED_FIELDS: &str = "All fields are required";
pub const ENTRY_NOT_FOUND: &str = "Entry not found";

/// A required field was empty or missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("All fields are required ({} is empty)", .field.json_name())]
pub struct ValidationError {
    pub field: Field,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("entry {0} not found")]
    NotFound(i64),

    #[error("database error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures seen by a client of the entry API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("entry {0} not found")]
    NotFound(i64),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(err) => ApiError::Rejected(err.to_string()),
            StoreError::NotFound(id) => ApiError::NotFound(id),
            StoreError::Storage(err) => ApiError::Server {
                status: 500,
                message: err.to_string(),
            },
        }
    }
}

/// Failures of a table view action.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("no row with id {0}")]
    UnknownRow(i64),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: ENTRY_NOT_FOUND.to_string(),
            details: None,
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Database error".to_string(),
            details: Some(err.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(_) => Self::bad_request(REQUIRED_FIELDS),
            StoreError::NotFound(_) => Self::not_found(),
            StoreError::Storage(err) => Self::internal(err),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(_: ValidationError) -> Self {
        Self::bad_request(REQUIRED_FIELDS)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}
