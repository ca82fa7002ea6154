// Identity extractors for protected routes

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use crate::auth::{error::AuthError, models::Role, token::TokenService};
use tracing::{debug, warn};

/// Authenticated user extractor for protected routes
///
/// Rejects the request when no valid bearer token is present.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub role: Role,
}

/// Read the bearer token from the Authorization header, if one was sent
fn bearer_token(parts: &Parts) -> Result<Option<&str>, AuthError> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_header = value.to_str().map_err(|_| AuthError::InvalidToken)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(Some)
        .ok_or(AuthError::InvalidToken)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    TokenService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.ok_or_else(|| {
            warn!("Missing Authorization header for {}", parts.uri.path());
            AuthError::MissingToken
        })?;

        let token_service = TokenService::from_ref(state);
        let claims = token_service.validate_access_token(token)?;

        debug!("Authenticated user_id={} role={}", claims.sub, claims.role);

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

/// Identity extractor for routes that also serve guests
///
/// A missing Authorization header yields `None`; a header that is present but
/// invalid is still rejected.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<AuthenticatedUser>);

impl OptionalUser {
    pub fn identity(&self) -> Option<&str> {
        self.0.as_ref().map(|user| user.user_id.as_str())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for OptionalUser
where
    TokenService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if bearer_token(parts)?.is_none() {
            return Ok(OptionalUser(None));
        }

        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        Ok(OptionalUser(Some(user)))
    }
}

/// Extractor that requires the admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    TokenService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        if user.role != Role::Admin {
            warn!(
                "Authorization failed: user_id={}, required_role={}, actual_role={}, endpoint={}",
                user.user_id,
                Role::Admin,
                user.role,
                parts.uri.path()
            );
            return Err(AuthError::InsufficientPermissions {
                required: Role::Admin,
                actual: user.role,
            });
        }

        Ok(AdminUser(user))
    }
}
