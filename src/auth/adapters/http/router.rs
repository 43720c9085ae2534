//! Route table for the auth endpoints.

use super::{
    handlers::{login, logout, me, refresh, sign_up},
    middleware::require_auth,
    state::AuthHttpState,
};
use crate::auth::ports::CredentialStore;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use mockable::Clock;
use std::sync::Arc;

/// Builds the auth router.
///
/// `/auth/signup`, `/auth/login`, `/auth/refresh`, and `/auth/logout` are
/// public; `/auth/me` sits behind [`require_auth`].
pub fn router<S, C>(state: Arc<AuthHttpState<S, C>>) -> Router
where
    S: CredentialStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    let guarded = Router::new()
        .route("/auth/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_auth::<S, C>,
        ));

    Router::new()
        .route("/auth/signup", post(sign_up::<S, C>))
        .route("/auth/login", post(login::<S, C>))
        .route("/auth/refresh", post(refresh::<S, C>))
        .route("/auth/logout", post(logout::<S, C>))
        .merge(guarded)
        .with_state(state)
}
