//! One-way hashing port for principal login secrets.

use crate::auth::domain::SecretHash;
use thiserror::Error;

/// Error raised when a secret cannot be hashed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to hash secret: {0}")]
pub struct SecretHashError(pub String);

/// Slow, salted one-way hash for login secrets.
///
/// Implementations may block; stores call them on the blocking thread pool.
pub trait SecretHasher: Send + Sync + 'static {
    /// Hashes a plaintext secret.
    ///
    /// # Errors
    ///
    /// Returns [`SecretHashError`] when the hashing engine fails.
    fn hash(&self, plaintext: &str) -> Result<SecretHash, SecretHashError>;

    /// Returns whether `plaintext` matches `hash`.
    ///
    /// Malformed hashes never verify.
    fn verify(&self, hash: &SecretHash, plaintext: &str) -> bool;
}
