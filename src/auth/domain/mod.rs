//! Domain model for principals, token payloads, and presented credentials.
//!
//! The auth domain keeps identity records and token shapes free of any
//! signing, hashing-engine, or transport concerns.

mod credentials;
mod error;
mod ids;
mod principal;
mod secret;
mod token;

pub use credentials::{RefreshTokenSources, RequestCredentials, parse_bearer};
pub use error::{AuthDomainError, UnauthorizedReason};
pub use ids::{PrincipalId, Username};
pub use principal::{PersistedPrincipalData, Principal};
pub use secret::{RefreshTokenHash, SecretHash};
pub use token::{IdentityClaim, TokenClaims, TokenKind, TokenPair, mask_token};
