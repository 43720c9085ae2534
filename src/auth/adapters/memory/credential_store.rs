//! In-memory credential store for tests and single-process deployments.

use async_trait::async_trait;
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::auth::{
    adapters::blocking_hasher,
    domain::{Principal, PrincipalId, RefreshTokenHash, Username},
    ports::{CredentialStore, CredentialStoreError, CredentialStoreResult, SecretHasher},
};

/// Thread-safe in-memory credential store.
///
/// Refresh-token rotation runs under the write lock, so concurrent
/// rotations presenting the same token are serialized and only the first
/// one observes a matching hash.
pub struct InMemoryCredentialStore<H, C>
where
    H: SecretHasher,
    C: Clock + Send + Sync,
{
    state: Arc<RwLock<InMemoryCredentialState>>,
    hasher: Arc<H>,
    clock: Arc<C>,
}

#[derive(Debug, Default)]
struct InMemoryCredentialState {
    principals: HashMap<PrincipalId, Principal>,
    username_index: HashMap<Username, PrincipalId>,
}

impl InMemoryCredentialState {
    fn live(&self, id: PrincipalId) -> Option<&Principal> {
        self.principals.get(&id).filter(|p| !p.is_deleted())
    }

    fn live_mut(&mut self, id: PrincipalId) -> CredentialStoreResult<&mut Principal> {
        self.principals
            .get_mut(&id)
            .filter(|p| !p.is_deleted())
            .ok_or(CredentialStoreError::NotFound(id))
    }
}

impl<H, C> InMemoryCredentialStore<H, C>
where
    H: SecretHasher,
    C: Clock + Send + Sync,
{
    /// Creates an empty store.
    #[must_use]
    pub fn new(hasher: Arc<H>, clock: Arc<C>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryCredentialState::default())),
            hasher,
            clock,
        }
    }
}

fn poisoned(err: impl std::fmt::Display) -> CredentialStoreError {
    CredentialStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl<H, C> CredentialStore for InMemoryCredentialStore<H, C>
where
    H: SecretHasher,
    C: Clock + Send + Sync,
{
    async fn find_by_id(&self, id: PrincipalId) -> CredentialStoreResult<Option<Principal>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.live(id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> CredentialStoreResult<Option<Principal>> {
        let state = self.state.read().map_err(poisoned)?;
        let principal = state
            .username_index
            .get(username)
            .and_then(|id| state.live(*id))
            .cloned();
        Ok(principal)
    }

    async fn create_principal(
        &self,
        username: &Username,
        secret: &str,
    ) -> CredentialStoreResult<Principal> {
        let secret_hash = blocking_hasher::hash_secret(&self.hasher, secret).await?;
        let mut state = self.state.write().map_err(poisoned)?;
        if state.username_index.contains_key(username) {
            return Err(CredentialStoreError::AlreadyExists(username.clone()));
        }

        let principal = Principal::new(username.clone(), secret_hash, &*self.clock);
        state.username_index.insert(username.clone(), principal.id());
        state.principals.insert(principal.id(), principal.clone());
        Ok(principal)
    }

    async fn set_refresh_token(
        &self,
        id: PrincipalId,
        token: Option<&str>,
    ) -> CredentialStoreResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        let principal = state.live_mut(id)?;
        principal.set_refresh_token_hash(token.map(RefreshTokenHash::of), &*self.clock);
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        id: PrincipalId,
        presented: &str,
        replacement: &str,
    ) -> CredentialStoreResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        let principal = state.live_mut(id)?;
        if !self.compare_refresh_token(principal, presented) {
            return Err(CredentialStoreError::RefreshTokenMismatch(id));
        }
        principal.set_refresh_token_hash(Some(RefreshTokenHash::of(replacement)), &*self.clock);
        Ok(())
    }

    async fn verify_secret(&self, principal: &Principal, secret: &str) -> bool {
        blocking_hasher::verify_secret(&self.hasher, principal.secret_hash(), secret).await
    }

    async fn soft_delete(&self, id: PrincipalId) -> CredentialStoreResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        let principal = state.live_mut(id)?;
        principal.set_refresh_token_hash(None, &*self.clock);
        principal.soft_delete(&*self.clock);
        Ok(())
    }

    async fn restore(&self, id: PrincipalId) -> CredentialStoreResult<Principal> {
        let mut state = self.state.write().map_err(poisoned)?;
        let principal = state
            .principals
            .get_mut(&id)
            .filter(|p| p.is_deleted())
            .ok_or(CredentialStoreError::NotFound(id))?;
        principal.restore(&*self.clock);
        Ok(principal.clone())
    }
}
