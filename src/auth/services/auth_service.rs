//! Sign-up, login, explicit refresh, and logout orchestration.

use super::{AccessGuard, AuthError, AuthResult, TokenIssuer, rotation};
use crate::auth::{
    domain::{
        IdentityClaim, Principal, PrincipalId, TokenKind, TokenPair, UnauthorizedReason, Username,
        mask_token,
    },
    ports::{CredentialStore, CredentialStoreError},
};
use crate::config::AuthConfig;
use mockable::Clock;
use secrecy::ExposeSecret;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};

/// Identity and token pair returned by a successful session operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// Identity the tokens were issued to.
    pub identity: IdentityClaim,
    /// Freshly issued token pair.
    pub tokens: TokenPair,
}

/// Authentication orchestration service.
///
/// Every operation that returns tokens persists the refresh-token hash
/// before returning, so the returned refresh token is immediately usable.
pub struct AuthService<S, C>
where
    S: CredentialStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    issuer: TokenIssuer<C>,
}

impl<S, C> Clone for AuthService<S, C>
where
    S: CredentialStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            issuer: self.issuer.clone(),
        }
    }
}

impl<S, C> AuthService<S, C>
where
    S: CredentialStore,
    C: Clock + Send + Sync,
{
    /// Creates a new auth service.
    #[must_use]
    pub const fn new(store: Arc<S>, config: Arc<AuthConfig>, clock: Arc<C>) -> Self {
        Self {
            store,
            issuer: TokenIssuer::new(config, clock),
        }
    }

    /// Returns an access guard sharing this service's store and policies.
    #[must_use]
    pub fn guard(&self) -> AccessGuard<S, C> {
        AccessGuard::new(Arc::clone(&self.store), self.issuer.clone())
    }

    /// Returns the token issuer.
    #[must_use]
    pub const fn issuer(&self) -> &TokenIssuer<C> {
        &self.issuer
    }

    /// Registers a principal and opens its first session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Domain`] when the username is malformed and
    /// [`AuthError::AlreadyExists`] when it is taken.
    pub async fn sign_up(&self, username: &str, secret: &str) -> AuthResult<AuthSession> {
        let validated = Username::new(username)?;
        let principal = self.store.create_principal(&validated, secret).await?;
        info!(principal_id = %principal.id(), "principal signed up");
        self.open_session(&principal).await
    }

    /// Verifies a username and secret and opens a new session.
    ///
    /// When a master secret is configured and matches, the stored hash is
    /// not consulted.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized(InvalidCredentials)` when the principal does
    /// not exist or the secret does not verify.
    pub async fn login(&self, username: &str, secret: &str) -> AuthResult<AuthSession> {
        let invalid = || AuthError::Unauthorized(UnauthorizedReason::InvalidCredentials);
        let Ok(validated) = Username::new(username) else {
            warn!(reason = %UnauthorizedReason::InvalidCredentials, "login rejected: malformed username");
            return Err(invalid());
        };
        let Some(principal) = self.store.find_by_username(&validated).await? else {
            warn!(reason = %UnauthorizedReason::InvalidCredentials, "login rejected: unknown username");
            return Err(invalid());
        };

        if self.master_secret_matches(secret) {
            warn!(principal_id = %principal.id(), "login accepted via master secret");
        } else if !self.store.verify_secret(&principal, secret).await {
            warn!(
                principal_id = %principal.id(),
                reason = %UnauthorizedReason::InvalidCredentials,
                "login rejected"
            );
            return Err(invalid());
        }

        info!(principal_id = %principal.id(), "principal logged in");
        self.open_session(&principal).await
    }

    /// Exchanges a valid refresh token for a rotated pair.
    ///
    /// Uses the same compare-and-swap as the access guard, so a refresh
    /// token is accepted at most once.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when the principal is absent, the token fails
    /// verification, or it no longer matches the stored hash.
    pub async fn refresh(
        &self,
        principal_id: PrincipalId,
        refresh_token: &str,
    ) -> AuthResult<AuthSession> {
        let Some(principal) = self.store.find_by_id(principal_id).await? else {
            warn!(%principal_id, reason = %UnauthorizedReason::PrincipalNotFound, "refresh rejected");
            return Err(AuthError::Unauthorized(UnauthorizedReason::PrincipalNotFound));
        };
        if let Err(err) = self.issuer.verify(TokenKind::Refresh, refresh_token) {
            warn!(
                %principal_id,
                reason = %UnauthorizedReason::InvalidRefreshToken,
                token = %mask_token(Some(refresh_token)),
                error = %err,
                "refresh rejected"
            );
            return Err(AuthError::Unauthorized(
                UnauthorizedReason::InvalidRefreshToken,
            ));
        }

        let tokens = rotation::rotate(&*self.store, &self.issuer, &principal, refresh_token)
            .await
            .inspect_err(|err| {
                if let Some(reason) = err.unauthorized_reason() {
                    warn!(%principal_id, %reason, "refresh rejected");
                }
            })?;
        debug!(%principal_id, "refresh token rotated");
        Ok(AuthSession {
            identity: principal.identity(),
            tokens,
        })
    }

    /// Ends the principal's session so no outstanding refresh token
    /// verifies. Idempotent, including for unknown principals.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] when the store fails.
    pub async fn logout(&self, principal_id: PrincipalId) -> AuthResult<()> {
        match self.store.set_refresh_token(principal_id, None).await {
            Ok(()) => {
                info!(%principal_id, "principal logged out");
                Ok(())
            }
            Err(CredentialStoreError::NotFound(_)) => {
                debug!(%principal_id, "logout for unknown principal ignored");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn open_session(&self, principal: &Principal) -> AuthResult<AuthSession> {
        let identity = principal.identity();
        let tokens = self.issuer.issue_pair(&identity)?;
        self.store
            .set_refresh_token(principal.id(), Some(&tokens.refresh_token))
            .await?;
        Ok(AuthSession { identity, tokens })
    }

    fn master_secret_matches(&self, secret: &str) -> bool {
        self.issuer
            .config()
            .master_password()
            .is_some_and(|master| {
                master
                    .expose_secret()
                    .as_bytes()
                    .ct_eq(secret.as_bytes())
                    .into()
            })
    }
}
