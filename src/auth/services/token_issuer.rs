//! Token pair issuance and per-kind verification.

use crate::auth::{
    codec::{self, TokenError},
    domain::{IdentityClaim, TokenClaims, TokenKind, TokenPair, mask_token},
};
use crate::config::{AuthConfig, TokenPolicy};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Signs and verifies tokens under the configured per-kind policies.
pub struct TokenIssuer<C>
where
    C: Clock + Send + Sync,
{
    config: Arc<AuthConfig>,
    clock: Arc<C>,
}

impl<C> Clone for TokenIssuer<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> TokenIssuer<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a token issuer.
    #[must_use]
    pub const fn new(config: Arc<AuthConfig>, clock: Arc<C>) -> Self {
        Self { config, clock }
    }

    /// Issues an access and refresh token from the same identity.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] when either token cannot be signed.
    pub fn issue_pair(&self, identity: &IdentityClaim) -> Result<TokenPair, TokenError> {
        let access_token = codec::sign(identity, self.config.access(), &*self.clock)?;
        let refresh_token = codec::sign(identity, self.config.refresh(), &*self.clock)?;
        log_issued(TokenKind::Access, &access_token);
        log_issued(TokenKind::Refresh, &refresh_token);
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verifies a token against the secret of its kind.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] or [`TokenError::Expired`] as
    /// classified by the codec.
    pub fn verify(&self, kind: TokenKind, token: &str) -> Result<TokenClaims, TokenError> {
        codec::verify(token, self.policy(kind).secret(), &*self.clock)
    }

    /// Returns the lifetime of refresh tokens.
    #[must_use]
    pub fn refresh_ttl(&self) -> Duration {
        self.config.refresh().ttl()
    }

    /// Returns the configuration the issuer was built with.
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    fn policy(&self, kind: TokenKind) -> &TokenPolicy {
        match kind {
            TokenKind::Access => self.config.access(),
            TokenKind::Refresh => self.config.refresh(),
        }
    }
}

fn log_issued(kind: TokenKind, token: &str) {
    if let Ok(claims) = codec::decode(token) {
        debug!(
            %kind,
            principal_id = %claims.sub,
            expires_at = claims.exp,
            token = %mask_token(Some(token)),
            "issued token"
        );
    }
}
