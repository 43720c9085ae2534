//! Shared state handed to auth handlers and the guard middleware.

use crate::auth::{
    ports::CredentialStore,
    services::{AccessGuard, AuthService},
};
use crate::config::AuthConfig;
use mockable::Clock;

/// Router state bundling the auth service and its guard.
pub struct AuthHttpState<S, C>
where
    S: CredentialStore,
    C: Clock + Send + Sync,
{
    service: AuthService<S, C>,
    guard: AccessGuard<S, C>,
}

impl<S, C> AuthHttpState<S, C>
where
    S: CredentialStore,
    C: Clock + Send + Sync,
{
    /// Creates router state from an auth service.
    #[must_use]
    pub fn new(service: AuthService<S, C>) -> Self {
        let guard = service.guard();
        Self { service, guard }
    }

    /// Returns the auth service.
    #[must_use]
    pub const fn service(&self) -> &AuthService<S, C> {
        &self.service
    }

    /// Returns the access guard.
    #[must_use]
    pub const fn guard(&self) -> &AccessGuard<S, C> {
        &self.guard
    }

    /// Returns the auth configuration.
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        self.service.issuer().config()
    }
}
