use axum::response::{IntoResponse, Response};

use crate::cart::CartError;
use crate::discounts::DiscountError;
use crate::error::ApiError;

/// Error types for quoting and placing orders
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Discount(#[from] DiscountError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Cart(err) => err.into(),
            CheckoutError::Discount(err) => err.into(),
            CheckoutError::Validation(errors) => ApiError::ValidationError(errors),
        }
    }
}

impl IntoResponse for CheckoutError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
