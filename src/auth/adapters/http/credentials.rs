//! Extraction of access and refresh credentials from request headers.

use super::cookies::unsign_cookie_value;
use crate::auth::domain::{RefreshTokenSources, RequestCredentials};
use axum::http::{
    HeaderMap,
    header::{AUTHORIZATION, COOKIE},
};
use secrecy::SecretString;

/// Name of the refresh-token cookie.
pub const REFRESH_COOKIE: &str = "rt";
/// Header carrying a refresh token when cookies are unavailable.
pub const REFRESH_HEADER: &str = "x-refresh-token";
/// Response header carrying a rotated access token.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Builds request credentials from headers.
///
/// A signed `rt` cookie is only honoured when `cookie_secret` is set and the
/// signature verifies; a cookie that looks signed but fails verification is
/// ignored rather than treated as a plain cookie.
#[must_use]
pub fn extract_credentials(
    headers: &HeaderMap,
    cookie_secret: Option<&SecretString>,
) -> RequestCredentials {
    let mut credentials =
        RequestCredentials::new().with_refresh_sources(refresh_sources(headers, cookie_secret));
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        credentials = credentials.with_authorization_header(value);
    }
    credentials
}

fn refresh_sources(
    headers: &HeaderMap,
    cookie_secret: Option<&SecretString>,
) -> RefreshTokenSources {
    let mut sources = RefreshTokenSources::new();
    if let Some(raw) = find_cookie(headers, REFRESH_COOKIE) {
        let decoded = percent_decode(&raw);
        if is_signed(&decoded) {
            if let Some(token) = cookie_secret.and_then(|secret| unsign_cookie_value(&decoded, secret))
            {
                sources = sources.with_signed_cookie(token);
            }
        } else {
            sources = sources.with_cookie(decoded);
        }
    }
    if let Some(value) = headers.get(REFRESH_HEADER).and_then(|v| v.to_str().ok()) {
        sources = sources.with_header(value.trim());
    }
    sources
}

fn is_signed(value: &str) -> bool {
    value.starts_with("s:")
}

fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_owned())
}

/// Decodes `%XX` escapes; malformed escapes are kept verbatim.
fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut position = 0;
    while let Some(&byte) = bytes.get(position) {
        let escaped = (byte == b'%')
            .then(|| bytes.get(position + 1..position + 3))
            .flatten()
            .and_then(|hex| std::str::from_utf8(hex).ok())
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());
        if let Some(value) = escaped {
            decoded.push(value);
            position += 3;
        } else {
            decoded.push(byte);
            position += 1;
        }
    }
    String::from_utf8(decoded).unwrap_or_else(|_| raw.to_owned())
}
