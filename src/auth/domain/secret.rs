//! One-way hashes held on a principal record.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;

/// Opaque one-way hash of a principal's login secret.
///
/// The encoding is owned by the [`crate::auth::ports::SecretHasher`] that
/// produced it; the domain never inspects it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretHash(String);

impl SecretHash {
    /// Wraps an encoded hash produced by a secret hasher or loaded from
    /// storage.
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Returns the encoded hash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretHash(..)")
    }
}

/// Hex-encoded SHA-256 digest of the currently valid refresh token.
///
/// Refresh tokens are high-entropy signed values, so a fast deterministic
/// digest is sufficient and lets storage compare hashes for equality inside a
/// single conditional update.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshTokenHash(String);

impl RefreshTokenHash {
    /// Hashes a raw refresh token.
    #[must_use]
    pub fn of(token: &str) -> Self {
        Self(hex::encode(Sha256::digest(token.as_bytes())))
    }

    /// Reconstructs a hash loaded from storage.
    #[must_use]
    pub fn from_persisted(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Returns whether `candidate` hashes to this value.
    ///
    /// The digest comparison runs in constant time.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        let other = Self::of(candidate);
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }

    /// Returns the hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RefreshTokenHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.0.get(..8).unwrap_or_default();
        write!(f, "RefreshTokenHash({prefix}..)")
    }
}
