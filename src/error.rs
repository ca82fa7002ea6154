// Error handling module for the Bookstore API
// Provides the shared error type and the uniform JSON error body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};
use utoipa::ToSchema;

/// Main error type for the API
///
/// Module errors (catalog, cart, discounts, checkout) convert into this type
/// so every endpoint answers with the same body shape.
#[derive(Debug)]
pub enum ApiError {
    /// Validation errors from request validation
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Malformed or semantically invalid input that is not a field-level validation failure
    /// Maps to HTTP 400 Bad Request
    BadRequest(String),

    /// Resource not found by ID
    /// Maps to HTTP 404 Not Found
    NotFound { resource: String, id: String },

    /// Duplicate resource conflict
    /// Maps to HTTP 409 Conflict
    Conflict { message: String },

    /// A business rule rejected the request (discount not applicable, insufficient stock)
    /// Maps to HTTP 422 Unprocessable Entity
    Unprocessable { error_code: String, message: String },

    /// A backing collaborator (database, registry, ledger) could not answer
    /// Maps to HTTP 503 Service Unavailable so clients know to retry
    ServiceUnavailable(String),

    /// Database operation errors
    /// Maps to HTTP 500 Internal Server Error
    DatabaseError(sqlx::Error),

    /// Internal server errors
    /// Maps to HTTP 500 Internal Server Error
    InternalError(String),

    /// Authentication failures
    /// Maps to HTTP 401 Unauthorized
    Unauthorized(String),

    /// Authorization failures
    /// Maps to HTTP 403 Forbidden
    Forbidden(String),
}

/// Consistent error response structure
///
/// Provides both a machine-readable `error_code` and a human-readable `message`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR", "NOT_FOUND")
    pub error_code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (e.g., field-level validation errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,

    /// ISO 8601 timestamp of when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    fn new(error_code: &str, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.to_string(),
            message: message.into(),
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    /// Convert ApiError to HTTP status code and ErrorResponse
    ///
    /// Server-side failures are logged with their full detail and answered
    /// with a generic message.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);
                let mut body = ErrorResponse::new("VALIDATION_ERROR", "Request validation failed");
                body.details = Some(serde_json::to_value(errors).unwrap_or(serde_json::json!({})));
                (StatusCode::BAD_REQUEST, body)
            }
            ApiError::BadRequest(message) => {
                debug!("Bad request: {}", message);
                (StatusCode::BAD_REQUEST, ErrorResponse::new("BAD_REQUEST", message.clone()))
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new("NOT_FOUND", format!("{} with id {} not found", resource, id)),
                )
            }
            ApiError::Conflict { message } => {
                warn!("Conflict error: {}", message);
                (StatusCode::CONFLICT, ErrorResponse::new("CONFLICT", message.clone()))
            }
            ApiError::Unprocessable { error_code, message } => {
                debug!("Rejected by business rule ({}): {}", error_code, message);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorResponse::new(error_code, message.clone()),
                )
            }
            ApiError::ServiceUnavailable(detail) => {
                error!("Collaborator failure: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse::new(
                        "SERVICE_UNAVAILABLE",
                        "The service is temporarily unavailable, please try again",
                    ),
                )
            }
            ApiError::DatabaseError(db_error) => {
                error!("Database error: {:?}", db_error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("DATABASE_ERROR", "A database error occurred"),
                )
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("INTERNAL_ERROR", "An internal server error occurred"),
                )
            }
            ApiError::Unauthorized(message) => {
                warn!("Unauthorized access attempt: {}", message);
                (StatusCode::UNAUTHORIZED, ErrorResponse::new("UNAUTHORIZED", message.clone()))
            }
            ApiError::Forbidden(message) => {
                warn!("Forbidden access attempt: {}", message);
                (StatusCode::FORBIDDEN, ErrorResponse::new("FORBIDDEN", message.clone()))
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::DatabaseError(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

/// Convert sqlx errors to ApiError
impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        ApiError::DatabaseError(error)
    }
}

/// Convert validator errors to ApiError
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}
