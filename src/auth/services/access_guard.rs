//! Request-time authorization with transparent refresh-token rotation.
//!
//! The guard never touches the response. It returns a verdict for the
//! request plus, when it rotated the session, a [`RotationAction`] that the
//! transport layer applies to the outgoing response.

use super::{AuthError, AuthResult, TokenIssuer, rotation};
use crate::auth::{
    codec::TokenError,
    domain::{IdentityClaim, RequestCredentials, TokenKind, TokenPair, UnauthorizedReason, mask_token},
    ports::CredentialStore,
};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Whether a request may proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationVerdict {
    /// The request proceeds with this identity attached.
    Allow(IdentityClaim),
    /// The request is rejected with a generic 401.
    Deny(UnauthorizedReason),
}

/// Response instruction emitted after an inline rotation.
///
/// The transport sets the refresh token as an http-only cookie that lives
/// for `refresh_ttl` and exposes the access token as a response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationAction {
    /// Newly issued pair.
    pub tokens: TokenPair,
    /// Lifetime of the new refresh token.
    pub refresh_ttl: Duration,
}

/// Outcome of [`AccessGuard::authorize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardDecision {
    verdict: AuthorizationVerdict,
    action: Option<RotationAction>,
}

impl GuardDecision {
    const fn allow(identity: IdentityClaim) -> Self {
        Self {
            verdict: AuthorizationVerdict::Allow(identity),
            action: None,
        }
    }

    const fn rotated(identity: IdentityClaim, action: RotationAction) -> Self {
        Self {
            verdict: AuthorizationVerdict::Allow(identity),
            action: Some(action),
        }
    }

    const fn deny(reason: UnauthorizedReason) -> Self {
        Self {
            verdict: AuthorizationVerdict::Deny(reason),
            action: None,
        }
    }

    /// Returns the authorization verdict.
    #[must_use]
    pub const fn verdict(&self) -> &AuthorizationVerdict {
        &self.verdict
    }

    /// Returns the post-authorization action, if the guard rotated tokens.
    #[must_use]
    pub const fn action(&self) -> Option<&RotationAction> {
        self.action.as_ref()
    }

    /// Returns whether the guard rotated the session for this request.
    #[must_use]
    pub const fn tokens_refreshed(&self) -> bool {
        self.action.is_some()
    }

    /// Returns the attached identity when the request is allowed.
    #[must_use]
    pub const fn identity(&self) -> Option<&IdentityClaim> {
        match &self.verdict {
            AuthorizationVerdict::Allow(identity) => Some(identity),
            AuthorizationVerdict::Deny(_) => None,
        }
    }

    /// Returns the deny reason when the request is rejected.
    #[must_use]
    pub const fn deny_reason(&self) -> Option<UnauthorizedReason> {
        match &self.verdict {
            AuthorizationVerdict::Allow(_) => None,
            AuthorizationVerdict::Deny(reason) => Some(*reason),
        }
    }

    /// Splits the decision into its verdict and optional action.
    #[must_use]
    pub fn into_parts(self) -> (AuthorizationVerdict, Option<RotationAction>) {
        (self.verdict, self.action)
    }
}

/// Per-request access guard.
///
/// Performs at most one rotation attempt per call and never retries.
pub struct AccessGuard<S, C>
where
    S: CredentialStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    issuer: TokenIssuer<C>,
}

impl<S, C> Clone for AccessGuard<S, C>
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

impl<S, C> AccessGuard<S, C>
where
    S: CredentialStore,
    C: Clock + Send + Sync,
{
    /// Creates an access guard.
    #[must_use]
    pub const fn new(store: Arc<S>, issuer: TokenIssuer<C>) -> Self {
        Self { store, issuer }
    }

    /// Decides whether a request bearing `credentials` may proceed.
    ///
    /// Every rejection is a [`AuthorizationVerdict::Deny`]. Only an expired
    /// access token leads to a refresh attempt; an invalid one is denied
    /// outright.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] only for infrastructure failures such as an
    /// unavailable store or a signing failure.
    pub async fn authorize(&self, credentials: &RequestCredentials) -> AuthResult<GuardDecision> {
        let Some(access_token) = credentials.access_token() else {
            return Ok(deny(UnauthorizedReason::MissingAccessToken, credentials));
        };

        match self.issuer.verify(TokenKind::Access, access_token) {
            Ok(claims) => {
                debug!(principal_id = %claims.sub, "access token accepted");
                return Ok(GuardDecision::allow(claims.identity()));
            }
            Err(TokenError::Expired { expired_at }) => {
                debug!(expired_at, "access token expired, attempting refresh");
            }
            Err(_) => return Ok(deny(UnauthorizedReason::InvalidAccessToken, credentials)),
        }

        self.try_rotation(credentials).await
    }

    async fn try_rotation(&self, credentials: &RequestCredentials) -> AuthResult<GuardDecision> {
        let Some(refresh_token) = credentials.refresh_token() else {
            return Ok(deny(UnauthorizedReason::MissingRefreshToken, credentials));
        };
        let Ok(claims) = self.issuer.verify(TokenKind::Refresh, refresh_token) else {
            return Ok(deny(UnauthorizedReason::InvalidRefreshToken, credentials));
        };
        let Some(principal) = self.store.find_by_id(claims.sub).await? else {
            return Ok(deny(UnauthorizedReason::PrincipalNotFound, credentials));
        };

        match rotation::rotate(&*self.store, &self.issuer, &principal, refresh_token).await {
            Ok(tokens) => {
                debug!(
                    principal_id = %principal.id(),
                    token = %mask_token(Some(&tokens.refresh_token)),
                    "session rotated inline"
                );
                let action = RotationAction {
                    tokens,
                    refresh_ttl: self.issuer.refresh_ttl(),
                };
                Ok(GuardDecision::rotated(principal.identity(), action))
            }
            Err(AuthError::Unauthorized(reason)) => Ok(deny(reason, credentials)),
            Err(err) => Err(err),
        }
    }
}

fn deny(reason: UnauthorizedReason, credentials: &RequestCredentials) -> GuardDecision {
    warn!(
        %reason,
        access_token = %mask_token(credentials.access_token()),
        refresh_token = %mask_token(credentials.refresh_token()),
        "request denied"
    );
    GuardDecision::deny(reason)
}
