//! axum transport for the auth endpoints and the access guard.
//!
//! The guard runs as middleware: it extracts [`RequestCredentials`] from the
//! request, asks the [`AccessGuard`] for a decision, attaches an
//! [`AuthenticatedPrincipal`] to allowed requests, and applies any rotation
//! to the outgoing response.
//!
//! [`RequestCredentials`]: crate::auth::domain::RequestCredentials
//! [`AccessGuard`]: crate::auth::services::AccessGuard

mod cookies;
mod cors;
mod credentials;
mod error;
mod handlers;
mod middleware;
mod router;
mod state;

pub use cookies::{clear_refresh_cookie, refresh_cookie, sign_cookie_value};
pub use cors::cors_layer;
pub use credentials::{ACCESS_TOKEN_HEADER, REFRESH_COOKIE, REFRESH_HEADER, extract_credentials};
pub use handlers::{
    CredentialsRequest, IdentityResponse, LogoutRequest, RefreshRequest, SessionResponse,
};
pub use middleware::{AuthenticatedPrincipal, require_auth};
pub use router::router;
pub use state::AuthHttpState;
