//! Error types for auth domain validation and authorization failures.

use thiserror::Error;

/// Errors returned while constructing auth domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthDomainError {
    /// The username is empty after trimming.
    #[error("username must not be empty")]
    EmptyUsername,

    /// The username exceeds the storage limit.
    #[error("username is {0} characters long, at most 100 are allowed")]
    UsernameTooLong(usize),

    /// The principal identifier is not a UUID.
    #[error("invalid principal identifier: {0}")]
    InvalidPrincipalId(String),
}

/// Diagnostic reason behind an `Unauthorized` outcome.
///
/// Every variant collapses to the same client-visible 401; the reason is
/// only ever written to logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum UnauthorizedReason {
    /// No bearer access token was presented.
    #[error("missing access token")]
    MissingAccessToken,

    /// The access token failed signature or structure checks.
    #[error("invalid access token")]
    InvalidAccessToken,

    /// The access token expired and no refresh token was presented.
    #[error("access expired, no refresh token")]
    MissingRefreshToken,

    /// The refresh token failed signature, structure, or expiry checks.
    #[error("invalid refresh token")]
    InvalidRefreshToken,

    /// The refresh token subject no longer resolves to a live principal.
    #[error("user not found")]
    PrincipalNotFound,

    /// The refresh token does not match the stored hash.
    #[error("refresh token mismatch")]
    RefreshTokenMismatch,

    /// The username or secret supplied at login did not verify.
    #[error("invalid credentials")]
    InvalidCredentials,
}
