use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::db;
use crate::discounts::evaluator::Rejection;
use crate::error::ApiError;

/// Error types for discount evaluation, consumption and administration
///
/// `Ineligible` is an expected outcome the customer can act on; `Collaborator`
/// means the registry or ledger could not answer and the caller may retry.
#[derive(Debug, thiserror::Error)]
pub enum DiscountError {
    #[error("Discount code not found: {0}")]
    NotFound(String),

    #[error("Discount not found: {0}")]
    DefinitionNotFound(Uuid),

    #[error("Discount not applicable: {0}")]
    Ineligible(Rejection),

    #[error("An identity is required to consume a discount")]
    IdentityRequired,

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Referenced record not found: {0}")]
    TargetNotFound(String),

    #[error("Discount storage unavailable: {0}")]
    Collaborator(String),
}

impl From<sqlx::Error> for DiscountError {
    fn from(err: sqlx::Error) -> Self {
        if db::is_unique_violation(&err) {
            return DiscountError::Conflict("A discount with this code already exists".to_string());
        }
        if db::is_foreign_key_violation(&err) {
            return DiscountError::TargetNotFound(err.to_string());
        }
        DiscountError::Collaborator(err.to_string())
    }
}

impl From<DiscountError> for ApiError {
    fn from(err: DiscountError) -> Self {
        match err {
            DiscountError::NotFound(code) => ApiError::NotFound {
                resource: "Discount code".to_string(),
                id: code,
            },
            DiscountError::DefinitionNotFound(id) => ApiError::NotFound {
                resource: "Discount".to_string(),
                id: id.to_string(),
            },
            DiscountError::Ineligible(rejection) => ApiError::Unprocessable {
                error_code: rejection.code().to_string(),
                message: rejection.to_string(),
            },
            DiscountError::IdentityRequired => ApiError::Unauthorized(err.to_string()),
            DiscountError::Validation(errors) => ApiError::ValidationError(errors),
            DiscountError::Conflict(message) => ApiError::Conflict { message },
            DiscountError::TargetNotFound(detail) => ApiError::NotFound {
                resource: "Discount target".to_string(),
                id: detail,
            },
            DiscountError::Collaborator(detail) => ApiError::ServiceUnavailable(detail),
        }
    }
}

impl IntoResponse for DiscountError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ineligible_and_collaborator_are_distinct() {
        let ineligible = ApiError::from(DiscountError::Ineligible(Rejection::BelowMinimumPurchase {
            minimum: dec!(50000),
        }));
        let unavailable = ApiError::from(DiscountError::Collaborator("connection refused".into()));

        assert_eq!(ineligible.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(unavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(
            ApiError::from(DiscountError::NotFound("NOPE".into())).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_sqlx_errors_are_collaborator_failures() {
        let err: DiscountError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DiscountError::Collaborator(_)));
    }
}
