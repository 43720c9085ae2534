//! Token payloads, pairs, and the identity claim attached to requests.

use super::PrincipalId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Token kind, distinguished only by signing secret and lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived bearer credential.
    Access,
    /// Long-lived credential exchanged for a new pair.
    Refresh,
}

impl TokenKind {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload embedded in both access and refresh tokens.
///
/// Every field is required; tokens whose payload does not decode into this
/// shape are rejected as invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Principal identifier.
    pub sub: PrincipalId,
    /// Principal username at issuance.
    pub username: String,
    /// Issued-at, in seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, in seconds since the Unix epoch.
    pub exp: i64,
    /// Unique token identifier.
    pub jti: Uuid,
}

impl TokenClaims {
    /// Returns the identity carried by this payload.
    #[must_use]
    pub fn identity(&self) -> IdentityClaim {
        IdentityClaim::new(self.sub, self.username.clone())
    }
}

/// Identity attached to an authorized request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityClaim {
    /// Principal identifier.
    pub subject: PrincipalId,
    /// Principal username.
    pub username: String,
}

impl IdentityClaim {
    /// Creates an identity claim.
    #[must_use]
    pub fn new(subject: PrincipalId, username: impl Into<String>) -> Self {
        Self {
            subject,
            username: username.into(),
        }
    }
}

/// Access and refresh tokens issued together from the same payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &mask_token(Some(&self.access_token)))
            .field("refresh_token", &mask_token(Some(&self.refresh_token)))
            .finish()
    }
}

/// Renders a token for logs without revealing it.
///
/// Shows the first and last six characters; tokens of twelve characters or
/// fewer render as `***` and absent tokens as `null`.
#[must_use]
pub fn mask_token(token: Option<&str>) -> String {
    const VISIBLE: usize = 6;
    let Some(raw) = token else {
        return "null".to_owned();
    };
    let length = raw.chars().count();
    if length <= VISIBLE * 2 {
        return "***".to_owned();
    }
    let head: String = raw.chars().take(VISIBLE).collect();
    let tail: String = raw.chars().skip(length - VISIBLE).collect();
    format!("{head}...{tail}")
}
