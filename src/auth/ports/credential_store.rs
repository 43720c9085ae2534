//! Persistence contract for principals and their refresh-token hashes.

use crate::auth::domain::{Principal, PrincipalId, Username};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for credential store operations.
pub type CredentialStoreResult<T> = Result<T, CredentialStoreError>;

/// Principal persistence contract.
///
/// Soft-deleted principals are invisible to every lookup and update except
/// [`CredentialStore::restore`].
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Finds a live principal by identifier.
    async fn find_by_id(&self, id: PrincipalId) -> CredentialStoreResult<Option<Principal>>;

    /// Finds a live principal by username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> CredentialStoreResult<Option<Principal>>;

    /// Creates a principal, hashing `secret` before it is stored.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::AlreadyExists`] when the username is
    /// taken, including by a soft-deleted principal.
    async fn create_principal(
        &self,
        username: &Username,
        secret: &str,
    ) -> CredentialStoreResult<Principal>;

    /// Replaces or clears the stored refresh-token hash.
    ///
    /// `Some(token)` stores the hash of `token`; `None` ends the session.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::NotFound`] when no live principal has
    /// the identifier.
    async fn set_refresh_token(
        &self,
        id: PrincipalId,
        token: Option<&str>,
    ) -> CredentialStoreResult<()>;

    /// Atomically replaces the stored refresh-token hash when it still
    /// matches `presented`.
    ///
    /// Of several concurrent calls presenting the same token, exactly one
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::RefreshTokenMismatch`] when the stored
    /// hash is absent or differs from the hash of `presented`, and
    /// [`CredentialStoreError::NotFound`] when no live principal has the
    /// identifier.
    async fn rotate_refresh_token(
        &self,
        id: PrincipalId,
        presented: &str,
        replacement: &str,
    ) -> CredentialStoreResult<()>;

    /// Returns whether `secret` verifies against the principal's stored
    /// login hash.
    async fn verify_secret(&self, principal: &Principal, secret: &str) -> bool;

    /// Returns whether `token` matches the principal's stored refresh-token
    /// hash. Always `false` when no session is active.
    fn compare_refresh_token(&self, principal: &Principal, token: &str) -> bool {
        principal
            .refresh_token_hash()
            .is_some_and(|hash| hash.matches(token))
    }

    /// Marks a principal deleted and clears its session.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::NotFound`] when no live principal has
    /// the identifier.
    async fn soft_delete(&self, id: PrincipalId) -> CredentialStoreResult<()>;

    /// Clears the delete marker of a soft-deleted principal.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::NotFound`] when no soft-deleted
    /// principal has the identifier, including when it is live.
    async fn restore(&self, id: PrincipalId) -> CredentialStoreResult<Principal>;
}

/// Errors returned by credential store implementations.
#[derive(Debug, Clone, Error)]
pub enum CredentialStoreError {
    /// The username is already taken.
    #[error("username already exists: {0}")]
    AlreadyExists(Username),

    /// No principal matched the identifier.
    #[error("principal not found: {0}")]
    NotFound(PrincipalId),

    /// The presented refresh token no longer matches the stored hash.
    #[error("refresh token mismatch for principal {0}")]
    RefreshTokenMismatch(PrincipalId),

    /// The login secret could not be hashed.
    #[error("secret hashing failed: {0}")]
    Hashing(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CredentialStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<crate::auth::ports::SecretHashError> for CredentialStoreError {
    fn from(err: crate::auth::ports::SecretHashError) -> Self {
        Self::Hashing(err.0)
    }
}
