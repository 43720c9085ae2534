//! Refresh-token rotation shared by the auth service and the access guard.

use super::{AuthError, AuthResult, TokenIssuer};
use crate::auth::{
    domain::{Principal, TokenPair, UnauthorizedReason},
    ports::{CredentialStore, CredentialStoreError},
};
use mockable::Clock;

/// Issues a new pair for `principal` and swaps its stored refresh hash from
/// `presented` to the new refresh token in one atomic step.
///
/// A concurrent rotation that already consumed `presented` surfaces as
/// `Unauthorized(RefreshTokenMismatch)`; a principal deleted in between
/// surfaces as `Unauthorized(PrincipalNotFound)`.
pub(super) async fn rotate<S, C>(
    store: &S,
    issuer: &TokenIssuer<C>,
    principal: &Principal,
    presented: &str,
) -> AuthResult<TokenPair>
where
    S: CredentialStore,
    C: Clock + Send + Sync,
{
    let tokens = issuer.issue_pair(&principal.identity())?;
    match store
        .rotate_refresh_token(principal.id(), presented, &tokens.refresh_token)
        .await
    {
        Ok(()) => Ok(tokens),
        Err(CredentialStoreError::NotFound(_)) => Err(AuthError::Unauthorized(
            UnauthorizedReason::PrincipalNotFound,
        )),
        Err(err) => Err(err.into()),
    }
}
