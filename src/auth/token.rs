// JWT validation for identity tokens issued by the external auth provider

use crate::auth::{error::AuthError, models::Role};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Opaque, stable identity of the caller
    pub sub: String,
    #[serde(default)]
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// Token service for JWT operations
#[derive(Clone)]
pub struct TokenService {
    secret: Arc<String>,
    access_token_duration: i64, // in seconds
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_token_duration", &self.access_token_duration)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a new TokenService with secret key
    /// Access tokens expire in 15 minutes (900 seconds)
    pub fn new(secret: String) -> Self {
        Self {
            secret: Arc::new(secret),
            access_token_duration: 900,
        }
    }

    /// Issue an access token for an identity
    ///
    /// Production tokens come from the auth provider; this exists for tooling
    /// and tests that need to speak the same format.
    pub fn generate_access_token(&self, subject: &str, role: Role) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();

        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat: now,
            exp: now + self.access_token_duration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::ConfigError(format!("token encoding failed: {}", e)))
    }

    /// Validate an access token and return its claims
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })?;

        if claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}
