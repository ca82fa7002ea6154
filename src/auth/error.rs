// Authentication and authorization error types

use axum::response::{IntoResponse, Response};
use std::fmt;

use crate::auth::models::Role;
use crate::error::ApiError;

/// Authentication and authorization error types
#[derive(Debug)]
pub enum AuthError {
    InvalidToken,
    ExpiredToken,
    MissingToken,

    /// User lacks required permissions for the operation
    InsufficientPermissions { required: Role, actual: Role },

    /// Configuration error in the token layer
    ConfigError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidToken => write!(f, "Invalid token"),
            AuthError::ExpiredToken => write!(f, "Token has expired"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::InsufficientPermissions { required, actual } => write!(
                f,
                "Insufficient permissions: required role '{}', but user has role '{}'",
                required, actual
            ),
            AuthError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken | AuthError::ExpiredToken | AuthError::MissingToken => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::InsufficientPermissions { required, .. } => ApiError::Forbidden(format!(
                "Insufficient permissions: required role '{}'",
                required
            )),
            AuthError::ConfigError(msg) => ApiError::InternalError(msg),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
