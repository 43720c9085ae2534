//! Principal aggregate root.

use super::{IdentityClaim, PrincipalId, RefreshTokenHash, SecretHash, Username};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Authenticated identity record.
///
/// At most one refresh-token hash is valid per principal; replacing it
/// invalidates the previously issued refresh token and clearing it ends the
/// session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    id: PrincipalId,
    username: Username,
    secret_hash: SecretHash,
    refresh_token_hash: Option<RefreshTokenHash>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPrincipalData {
    /// Persisted principal identifier.
    pub id: PrincipalId,
    /// Persisted unique username.
    pub username: Username,
    /// Persisted login secret hash.
    pub secret_hash: SecretHash,
    /// Persisted refresh-token hash, if a session is active.
    pub refresh_token_hash: Option<RefreshTokenHash>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Principal {
    /// Creates a new principal without an active session.
    #[must_use]
    pub fn new(username: Username, secret_hash: SecretHash, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: PrincipalId::new(),
            username,
            secret_hash,
            refresh_token_hash: None,
            created_at: timestamp,
            updated_at: timestamp,
            deleted_at: None,
        }
    }

    /// Reconstructs a principal from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedPrincipalData) -> Self {
        Self {
            id: data.id,
            username: data.username,
            secret_hash: data.secret_hash,
            refresh_token_hash: data.refresh_token_hash,
            created_at: data.created_at,
            updated_at: data.updated_at,
            deleted_at: data.deleted_at,
        }
    }

    /// Returns the principal identifier.
    #[must_use]
    pub const fn id(&self) -> PrincipalId {
        self.id
    }

    /// Returns the unique username.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Returns the login secret hash.
    #[must_use]
    pub const fn secret_hash(&self) -> &SecretHash {
        &self.secret_hash
    }

    /// Returns the hash of the currently valid refresh token, if any.
    #[must_use]
    pub const fn refresh_token_hash(&self) -> Option<&RefreshTokenHash> {
        self.refresh_token_hash.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the soft-delete timestamp, if the principal was deleted.
    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns whether the principal has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns the identity claim embedded in tokens issued to this
    /// principal.
    #[must_use]
    pub fn identity(&self) -> IdentityClaim {
        IdentityClaim::new(self.id, self.username.as_str())
    }

    /// Replaces the stored refresh-token hash.
    ///
    /// `None` clears the session so no outstanding refresh token verifies.
    pub fn set_refresh_token_hash(&mut self, hash: Option<RefreshTokenHash>, clock: &impl Clock) {
        self.refresh_token_hash = hash;
        self.touch(clock);
    }

    /// Marks the principal as deleted.
    pub fn soft_delete(&mut self, clock: &impl Clock) {
        let timestamp = clock.utc();
        self.deleted_at = Some(timestamp);
        self.updated_at = timestamp;
    }

    /// Clears the soft-delete marker.
    pub fn restore(&mut self, clock: &impl Clock) {
        self.deleted_at = None;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
