//! HS256 token signing and verification.
//!
//! Expiry is checked against the injected clock rather than the system time
//! so token lifetimes are deterministic under test. Signature and structure
//! are verified first; a tampered token is reported as invalid even when its
//! expiry has also passed.

use crate::auth::domain::{IdentityClaim, TokenClaims};
use crate::config::TokenPolicy;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by the token codec.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The signature and structure verified but the token has expired.
    #[error("token expired at {expired_at}")]
    Expired {
        /// Expiry of the rejected token, in seconds since the Unix epoch.
        expired_at: i64,
    },

    /// The signature, structure, or payload did not verify.
    #[error("invalid token: {0}")]
    Invalid(String),

    /// The token could not be signed.
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Signs a token carrying `identity`, issued now and expiring after the
/// policy's lifetime.
///
/// # Errors
///
/// Returns [`TokenError::Signing`] when the lifetime does not fit the
/// payload or encoding fails.
pub fn sign(
    identity: &IdentityClaim,
    policy: &TokenPolicy,
    clock: &impl Clock,
) -> Result<String, TokenError> {
    let issued_at = clock.utc().timestamp();
    let ttl = i64::try_from(policy.ttl().as_secs())
        .map_err(|err| TokenError::Signing(err.to_string()))?;
    let expires_at = issued_at
        .checked_add(ttl)
        .ok_or_else(|| TokenError::Signing("expiry overflows".to_owned()))?;
    let claims = TokenClaims {
        sub: identity.subject,
        username: identity.username.clone(),
        iat: issued_at,
        exp: expires_at,
        jti: Uuid::new_v4(),
    };
    let key = EncodingKey::from_secret(policy.secret().expose_secret().as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|err| TokenError::Signing(err.to_string()))
}

/// Verifies a token's signature, structure, and expiry.
///
/// A token is expired once the clock has passed its `exp` second.
///
/// # Errors
///
/// Returns [`TokenError::Invalid`] when the signature or payload does not
/// verify and [`TokenError::Expired`] when it verifies but has expired.
pub fn verify(
    token: &str,
    secret: &SecretString,
    clock: &impl Clock,
) -> Result<TokenClaims, TokenError> {
    let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
    let claims = jsonwebtoken::decode::<TokenClaims>(token, &key, &base_validation())
        .map_err(|err| TokenError::Invalid(err.to_string()))?
        .claims;
    if clock.utc().timestamp() > claims.exp {
        return Err(TokenError::Expired {
            expired_at: claims.exp,
        });
    }
    Ok(claims)
}

/// Reads a token's payload without checking its signature or expiry.
///
/// Only for diagnostics; never base an authorization decision on it.
///
/// # Errors
///
/// Returns [`TokenError::Invalid`] when the token is not structurally a
/// token with the expected payload.
pub fn decode(token: &str) -> Result<TokenClaims, TokenError> {
    let mut validation = base_validation();
    validation.insecure_disable_signature_validation();
    jsonwebtoken::decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|err| TokenError::Invalid(err.to_string()))
}

fn base_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();
    validation.leeway = 0;
    validation
}
