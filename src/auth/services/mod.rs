//! Application services for session issuance and request authorization.

mod access_guard;
mod auth_service;
mod error;
mod rotation;
mod token_issuer;

pub use access_guard::{AccessGuard, AuthorizationVerdict, GuardDecision, RotationAction};
pub use auth_service::{AuthService, AuthSession};
pub use error::{AuthError, AuthResult};
pub use token_issuer::TokenIssuer;
