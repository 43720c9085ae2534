//! Transport-agnostic view of the credentials presented with a request.

use std::fmt;

use super::mask_token;

/// Places a refresh token may arrive from, in precedence order.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RefreshTokenSources {
    signed_cookie: Option<String>,
    cookie: Option<String>,
    header: Option<String>,
}

impl RefreshTokenSources {
    /// Creates an empty source set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of the signature-verified `rt` cookie.
    #[must_use]
    pub fn with_signed_cookie(mut self, token: impl Into<String>) -> Self {
        self.signed_cookie = non_empty(token.into());
        self
    }

    /// Sets the value of the plain `rt` cookie.
    #[must_use]
    pub fn with_cookie(mut self, token: impl Into<String>) -> Self {
        self.cookie = non_empty(token.into());
        self
    }

    /// Sets the value of the `x-refresh-token` header.
    #[must_use]
    pub fn with_header(mut self, token: impl Into<String>) -> Self {
        self.header = non_empty(token.into());
        self
    }

    /// Returns the refresh token from the first present source: signed
    /// cookie, then plain cookie, then header.
    #[must_use]
    pub fn resolve(&self) -> Option<&str> {
        self.signed_cookie
            .as_deref()
            .or(self.cookie.as_deref())
            .or(self.header.as_deref())
    }
}

impl fmt::Debug for RefreshTokenSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenSources")
            .field("signed_cookie", &mask_token(self.signed_cookie.as_deref()))
            .field("cookie", &mask_token(self.cookie.as_deref()))
            .field("header", &mask_token(self.header.as_deref()))
            .finish()
    }
}

/// Credentials extracted from an inbound request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RequestCredentials {
    access_token: Option<String>,
    refresh: RefreshTokenSources,
}

impl RequestCredentials {
    /// Creates an empty credential set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bearer access token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = non_empty(token.into());
        self
    }

    /// Sets the access token from a raw `Authorization` header value.
    ///
    /// Only the `Bearer` scheme is recognized; anything else leaves the
    /// access token absent.
    #[must_use]
    pub fn with_authorization_header(mut self, value: &str) -> Self {
        self.access_token = parse_bearer(value);
        self
    }

    /// Sets the refresh-token sources.
    #[must_use]
    pub fn with_refresh_sources(mut self, sources: RefreshTokenSources) -> Self {
        self.refresh = sources;
        self
    }

    /// Returns the bearer access token, if present.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Returns the refresh token chosen by source precedence, if any.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh.resolve()
    }

    /// Returns the raw refresh-token sources.
    #[must_use]
    pub const fn refresh_sources(&self) -> &RefreshTokenSources {
        &self.refresh
    }
}

impl fmt::Debug for RequestCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestCredentials")
            .field("access_token", &mask_token(self.access_token.as_deref()))
            .field("refresh", &self.refresh)
            .finish()
    }
}

/// Extracts the token from a `Bearer <token>` header value.
#[must_use]
pub fn parse_bearer(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    non_empty(token.to_owned())
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
