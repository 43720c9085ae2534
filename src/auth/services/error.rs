//! Service-level errors for authentication operations.

use crate::auth::{
    codec::TokenError,
    domain::{AuthDomainError, PrincipalId, UnauthorizedReason, Username},
    ports::CredentialStoreError,
};
use thiserror::Error;

/// Service-level errors for authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The caller is not authenticated. The reason is diagnostic only.
    #[error("unauthorized: {0}")]
    Unauthorized(UnauthorizedReason),

    /// Sign-up attempted with a username that is already taken.
    #[error("username already exists: {0}")]
    AlreadyExists(Username),

    /// The principal vanished between issuance and a dependent lookup.
    #[error("principal not found: {0}")]
    NotFound(PrincipalId),

    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] AuthDomainError),

    /// A token could not be issued.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The credential store failed.
    #[error(transparent)]
    Store(CredentialStoreError),
}

impl AuthError {
    /// Returns the unauthorized reason when this is an `Unauthorized` error.
    #[must_use]
    pub const fn unauthorized_reason(&self) -> Option<UnauthorizedReason> {
        match self {
            Self::Unauthorized(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<CredentialStoreError> for AuthError {
    fn from(err: CredentialStoreError) -> Self {
        match err {
            CredentialStoreError::AlreadyExists(username) => Self::AlreadyExists(username),
            CredentialStoreError::NotFound(id) => Self::NotFound(id),
            CredentialStoreError::RefreshTokenMismatch(_) => {
                Self::Unauthorized(UnauthorizedReason::RefreshTokenMismatch)
            }
            other => Self::Store(other),
        }
    }
}

/// Result type for authentication service operations.
pub type AuthResult<T> = Result<T, AuthError>;
