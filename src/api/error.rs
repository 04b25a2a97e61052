//! API error type and its HTTP mapping.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError { pub field: String, pub message: String }

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("Product not found")]
    NotFound,

    #[error("{field} already exists")]
    Duplicate { field: String },

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        let duplicate = e
            .as_database_error()
            .filter(|d| d.code().as_deref() == Some("23505"))
            .map(|d| constraint_field(d.constraint().unwrap_or("field")));
        match duplicate {
            Some(field) => Self::Duplicate { field },
            None => Self::Database(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

/// `products_sku_key` -> `sku`
fn constraint_field(constraint: &str) -> String {
    let field = constraint.strip_prefix("products_").unwrap_or(constraint);
    field.strip_suffix("_key").unwrap_or(field).to_string()
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<FieldError>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, errors) = match &self {
            Self::Validation(errors) => (StatusCode::BAD_REQUEST, errors.clone()),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, vec![]),
            Self::Duplicate { field } => (StatusCode::BAD_REQUEST, vec![FieldError::new(field, self.to_string())]),
            Self::NotFound => (StatusCode::NOT_FOUND, vec![]),
            Self::Database(_) | Self::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, vec![])
            }
        };
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Duplicate { .. } => "Validation failed".to_string(),
            other => other.to_string(),
        };
        (status, Json(ErrorBody { message, errors })).into_response()
    }
}
