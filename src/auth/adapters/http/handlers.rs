//! Sign-up, login, refresh, logout, and identity endpoints.

use super::{
    cookies::{clear_refresh_cookie, refresh_cookie},
    credentials::extract_credentials,
    middleware::AuthenticatedPrincipal,
    state::AuthHttpState,
};
use crate::auth::{
    codec::TokenError,
    domain::{PrincipalId, UnauthorizedReason},
    ports::CredentialStore,
    services::{AuthError, AuthSession},
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of sign-up and login requests.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsRequest {
    /// Login name.
    pub username: String,
    /// Plaintext secret.
    pub password: String,
}

/// Body of explicit refresh requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// Principal identifier.
    pub user_id: String,
    /// Refresh token; taken from the cookie or header when omitted.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Body of logout requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    /// Principal identifier.
    pub user_id: String,
}

/// Response body for endpoints that open or rotate a session.
///
/// The refresh token travels only in the `rt` cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Access token for the `Authorization: Bearer` header.
    pub access_token: String,
    /// Principal identifier.
    pub user_id: PrincipalId,
    /// Principal username.
    pub username: String,
}

/// Response body of the identity endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    /// Principal identifier.
    pub user_id: PrincipalId,
    /// Principal username.
    pub username: String,
    /// Whether the guard rotated the session on this request.
    pub tokens_refreshed: bool,
}

pub(super) async fn sign_up<S, C>(
    State(state): State<Arc<AuthHttpState<S, C>>>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Response, AuthError>
where
    S: CredentialStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let session = state
        .service()
        .sign_up(&body.username, &body.password)
        .await?;
    session_response(&state, StatusCode::CREATED, session)
}

pub(super) async fn login<S, C>(
    State(state): State<Arc<AuthHttpState<S, C>>>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Response, AuthError>
where
    S: CredentialStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let session = state
        .service()
        .login(&body.username, &body.password)
        .await?;
    session_response(&state, StatusCode::OK, session)
}

pub(super) async fn refresh<S, C>(
    State(state): State<Arc<AuthHttpState<S, C>>>,
    headers: HeaderMap,
    Json(body): Json<RefreshRequest>,
) -> Result<Response, AuthError>
where
    S: CredentialStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let principal_id = PrincipalId::parse(&body.user_id)?;
    let token = body
        .refresh_token
        .filter(|token| !token.trim().is_empty())
        .or_else(|| {
            extract_credentials(&headers, state.config().cookie_secret())
                .refresh_token()
                .map(str::to_owned)
        })
        .ok_or(AuthError::Unauthorized(
            UnauthorizedReason::MissingRefreshToken,
        ))?;
    let session = state.service().refresh(principal_id, &token).await?;
    session_response(&state, StatusCode::OK, session)
}

pub(super) async fn logout<S, C>(
    State(state): State<Arc<AuthHttpState<S, C>>>,
    Json(body): Json<LogoutRequest>,
) -> Result<Response, AuthError>
where
    S: CredentialStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let principal_id = PrincipalId::parse(&body.user_id)?;
    state.service().logout(principal_id).await?;
    let cookie =
        clear_refresh_cookie(state.config().secure_cookie()).map_err(header_encoding_error)?;
    Ok((StatusCode::OK, [(SET_COOKIE, cookie)]).into_response())
}

pub(super) async fn me(principal: AuthenticatedPrincipal) -> Json<IdentityResponse> {
    Json(IdentityResponse {
        user_id: principal.identity.subject,
        username: principal.identity.username,
        tokens_refreshed: principal.tokens_refreshed,
    })
}

fn session_response<S, C>(
    state: &AuthHttpState<S, C>,
    status: StatusCode,
    session: AuthSession,
) -> Result<Response, AuthError>
where
    S: CredentialStore,
    C: Clock + Send + Sync,
{
    let AuthSession { identity, tokens } = session;
    let cookie = refresh_cookie(
        &tokens.refresh_token,
        state.service().issuer().refresh_ttl(),
        state.config().secure_cookie(),
    )
    .map_err(header_encoding_error)?;
    let body = SessionResponse {
        access_token: tokens.access_token,
        user_id: identity.subject,
        username: identity.username,
    };
    Ok((status, [(SET_COOKIE, cookie)], Json(body)).into_response())
}

fn header_encoding_error(err: axum::http::header::InvalidHeaderValue) -> AuthError {
    AuthError::Token(TokenError::Signing(err.to_string()))
}
