use axum::response::{IntoResponse, Response};

use crate::catalog::query::QueryValidationError;
use crate::error::ApiError;

/// Error types for catalog lookups
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Book not found: {0}")]
    BookNotFound(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The catalog store could not answer
    #[error("Catalog unavailable: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        CatalogError::Storage(err.to_string())
    }
}

impl From<QueryValidationError> for CatalogError {
    fn from(err: QueryValidationError) -> Self {
        CatalogError::InvalidQuery(err.message)
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::BookNotFound(id) => ApiError::NotFound {
                resource: "Book".to_string(),
                id,
            },
            CatalogError::InvalidQuery(msg) => ApiError::BadRequest(msg),
            CatalogError::Storage(msg) => ApiError::ServiceUnavailable(msg),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
