//! HTTP mapping for auth errors.
//!
//! Every `Unauthorized` variant renders the same 401 body; the reason stays
//! in the logs.

use crate::auth::services::AuthError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

const INTERNAL_MESSAGE: &str = "internal server error";

/// Renders a JSON error response.
pub(super) fn error_response(status: StatusCode, code: &'static str, message: String) -> Response {
    (
        status,
        Json(ErrorEnvelope {
            error: ErrorBody { code, message },
        }),
    )
        .into_response()
}

/// Renders the generic 500 response.
pub(super) fn internal_error() -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INT_001",
        INTERNAL_MESSAGE.to_owned(),
    )
}

const fn status_code(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AuthError::AlreadyExists(_) | AuthError::Domain(_) => StatusCode::BAD_REQUEST,
        AuthError::NotFound(_) => StatusCode::NOT_FOUND,
        AuthError::Token(_) | AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

const fn error_code(err: &AuthError) -> &'static str {
    match err {
        AuthError::Unauthorized(_) => "AUTH_001",
        AuthError::AlreadyExists(_) => "USR_001",
        AuthError::Domain(_) => "VAL_001",
        AuthError::NotFound(_) => "USR_002",
        AuthError::Token(_) | AuthError::Store(_) => "INT_001",
    }
}

fn public_message(err: &AuthError) -> String {
    match err {
        AuthError::Unauthorized(_) => "unauthorized".to_owned(),
        AuthError::AlreadyExists(_) => "username already exists".to_owned(),
        AuthError::Domain(inner) => inner.to_string(),
        AuthError::NotFound(_) => "principal not found".to_owned(),
        AuthError::Token(_) | AuthError::Store(_) => INTERNAL_MESSAGE.to_owned(),
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Token(_) | Self::Store(_)) {
            error!(error = %self, "auth request failed");
        }
        error_response(status_code(&self), error_code(&self), public_message(&self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        domain::{AuthDomainError, UnauthorizedReason},
        ports::CredentialStoreError,
    };
    use rstest::rstest;

    #[rstest]
    #[case(UnauthorizedReason::MissingAccessToken)]
    #[case(UnauthorizedReason::RefreshTokenMismatch)]
    #[case(UnauthorizedReason::PrincipalNotFound)]
    fn every_unauthorized_reason_renders_the_same_response(#[case] reason: UnauthorizedReason) {
        let err = AuthError::Unauthorized(reason);

        assert_eq!(status_code(&err), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(&err), "AUTH_001");
        assert_eq!(public_message(&err), "unauthorized");
    }

    #[test]
    fn domain_errors_are_bad_requests() {
        let err = AuthError::Domain(AuthDomainError::EmptyUsername);

        assert_eq!(status_code(&err), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&err), "VAL_001");
    }

    #[test]
    fn store_failures_hide_details() {
        let err = AuthError::Store(CredentialStoreError::persistence(std::io::Error::other(
            "connection refused to db-primary:5432",
        )));

        assert_eq!(status_code(&err), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(public_message(&err), INTERNAL_MESSAGE);
    }
}
