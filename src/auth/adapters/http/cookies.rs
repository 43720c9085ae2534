//! Refresh-cookie construction and signed-cookie verification.
//!
//! Signed cookies use the `s:<value>.<signature>` layout, where the
//! signature is the unpadded base64 HMAC-SHA256 of `<value>` under the
//! cookie secret.

use super::credentials::REFRESH_COOKIE;
use axum::http::{HeaderValue, header::InvalidHeaderValue};
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use hmac::{Hmac, Mac, digest::InvalidLength};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

/// Builds the `Set-Cookie` value carrying a refresh token.
///
/// # Errors
///
/// Returns [`InvalidHeaderValue`] when the token contains characters that
/// cannot appear in a header.
pub fn refresh_cookie(
    token: &str,
    ttl: Duration,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = ttl.as_secs();
    let mut cookie =
        format!("{REFRESH_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Builds the `Set-Cookie` value that removes the refresh cookie.
///
/// # Errors
///
/// Returns [`InvalidHeaderValue`] if the cookie cannot be encoded.
pub fn clear_refresh_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{REFRESH_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Signs a cookie value as `s:<value>.<signature>`.
///
/// # Errors
///
/// Returns [`InvalidLength`] if the MAC rejects the key.
pub fn sign_cookie_value(value: &str, secret: &SecretString) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())?;
    mac.update(value.as_bytes());
    let signature = STANDARD_NO_PAD.encode(mac.finalize().into_bytes());
    Ok(format!("s:{value}.{signature}"))
}

/// Returns the inner value of a signed cookie when its signature verifies.
pub(super) fn unsign_cookie_value(signed: &str, secret: &SecretString) -> Option<String> {
    let body = signed.strip_prefix("s:")?;
    let (value, signature) = body.rsplit_once('.')?;
    let expected = STANDARD_NO_PAD.decode(signature.trim_end_matches('=')).ok()?;
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes()).ok()?;
    mac.update(value.as_bytes());
    mac.verify_slice(&expected).ok()?;
    Some(value.to_owned())
}
