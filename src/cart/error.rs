use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::catalog::CatalogError;
use crate::error::ApiError;

/// Error types for cart operations
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("Book not found: {0}")]
    BookNotFound(Uuid),

    #[error("Insufficient stock for book {book_id}: requested {requested}, available {available}")]
    InsufficientStock {
        book_id: Uuid,
        available: i32,
        requested: i32,
    },

    #[error("Cart item not found: {0}")]
    LineNotFound(Uuid),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// The cart store or the catalog could not answer
    #[error("Cart storage unavailable: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for CartError {
    fn from(err: sqlx::Error) -> Self {
        CartError::Storage(err.to_string())
    }
}

impl From<CatalogError> for CartError {
    fn from(err: CatalogError) -> Self {
        CartError::Storage(err.to_string())
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::BookNotFound(id) => ApiError::NotFound {
                resource: "Book".to_string(),
                id: id.to_string(),
            },
            CartError::LineNotFound(id) => ApiError::NotFound {
                resource: "Cart item".to_string(),
                id: id.to_string(),
            },
            CartError::InsufficientStock { .. } => ApiError::Unprocessable {
                error_code: "INSUFFICIENT_STOCK".to_string(),
                message: err.to_string(),
            },
            CartError::EmptyCart => ApiError::Unprocessable {
                error_code: "EMPTY_CART".to_string(),
                message: err.to_string(),
            },
            CartError::InvalidQuantity(_) => ApiError::BadRequest(err.to_string()),
            CartError::Validation(errors) => ApiError::ValidationError(errors),
            CartError::Storage(msg) => ApiError::ServiceUnavailable(msg),
        }
    }
}

impl IntoResponse for CartError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let id = Uuid::new_v4();
        assert_eq!(
            ApiError::from(CartError::BookNotFound(id)).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(CartError::InsufficientStock {
                book_id: id,
                available: 4,
                requested: 5,
            })
            .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(CartError::Storage("timeout".into())).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
