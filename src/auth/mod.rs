// Authentication module
// Validates bearer tokens from the external auth provider and exposes the caller's identity

pub mod error;
pub mod middleware;
pub mod models;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use middleware::{AdminUser, AuthenticatedUser, OptionalUser};
pub use models::Role;
pub use token::{Claims, TokenService};
