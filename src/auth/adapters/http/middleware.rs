//! Guard middleware and the authenticated-principal extractor.

use super::{
    cookies::refresh_cookie,
    credentials::{ACCESS_TOKEN_HEADER, extract_credentials},
    error::internal_error,
    state::AuthHttpState,
};
use crate::auth::{
    domain::IdentityClaim,
    ports::CredentialStore,
    services::{AuthError, AuthorizationVerdict, RotationAction},
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderMap, HeaderValue,
        header::{InvalidHeaderValue, SET_COOKIE},
        request::Parts,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::error;

/// Identity attached to a request by [`require_auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    /// Identity of the caller.
    pub identity: IdentityClaim,
    /// Whether the guard rotated the session while admitting this request.
    pub tokens_refreshed: bool,
}

impl<St> FromRequestParts<St> for AuthenticatedPrincipal
where
    St: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            error!("authenticated principal requested on a route without the auth guard");
            internal_error()
        })
    }
}

/// Admits requests the access guard allows and rejects the rest with 401.
///
/// When the guard rotates the session, the new refresh token is set as the
/// `rt` cookie and the new access token is returned in `x-access-token`.
pub async fn require_auth<S, C>(
    State(state): State<Arc<AuthHttpState<S, C>>>,
    mut request: Request,
    next: Next,
) -> Response
where
    S: CredentialStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let credentials = extract_credentials(request.headers(), state.config().cookie_secret());
    let decision = match state.guard().authorize(&credentials).await {
        Ok(decision) => decision,
        Err(err) => return err.into_response(),
    };

    let (verdict, action) = decision.into_parts();
    let identity = match verdict {
        AuthorizationVerdict::Allow(identity) => identity,
        AuthorizationVerdict::Deny(reason) => {
            return AuthError::Unauthorized(reason).into_response();
        }
    };
    request.extensions_mut().insert(AuthenticatedPrincipal {
        identity,
        tokens_refreshed: action.is_some(),
    });

    let mut response = next.run(request).await;
    if let Some(rotation) = action {
        if let Err(err) = apply_rotation(
            response.headers_mut(),
            &rotation,
            state.config().secure_cookie(),
        ) {
            error!(error = %err, "failed to attach rotated tokens to response");
            return internal_error();
        }
    }
    response
}

fn apply_rotation(
    headers: &mut HeaderMap,
    rotation: &RotationAction,
    secure: bool,
) -> Result<(), InvalidHeaderValue> {
    let cookie = refresh_cookie(&rotation.tokens.refresh_token, rotation.refresh_ttl, secure)?;
    let access = HeaderValue::from_str(&rotation.tokens.access_token)?;
    headers.append(SET_COOKIE, cookie);
    headers.insert(ACCESS_TOKEN_HEADER, access);
    Ok(())
}
