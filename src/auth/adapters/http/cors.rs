//! Cross-origin policy for a browser frontend.

use super::credentials::{ACCESS_TOKEN_HEADER, REFRESH_HEADER};
use axum::http::{
    HeaderName, HeaderValue, Method,
    header::{AUTHORIZATION, CONTENT_TYPE, InvalidHeaderValue},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Builds a CORS layer admitting credentialed requests from one origin.
///
/// Credentials must be allowed so the browser sends and stores the `rt`
/// cookie; `x-access-token` is exposed so scripts can read a rotated access
/// token.
///
/// # Errors
///
/// Returns [`InvalidHeaderValue`] when the origin cannot be used as a header
/// value.
pub fn cors_layer(frontend_origin: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    let origin = HeaderValue::from_str(frontend_origin.trim().trim_end_matches('/'))?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(REFRESH_HEADER),
        ])
        .expose_headers([HeaderName::from_static(ACCESS_TOKEN_HEADER)])
        .allow_credentials(true))
}
