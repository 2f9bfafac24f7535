use axum::http::{HeaderMap, header};

use coffeeshop_core::AuthError;

const BEARER: &str = "Bearer";

/// Pulls the raw token out of an `Authorization: Bearer <token>` header.
///
/// The header must consist of exactly two space-separated parts, the first being
/// the case-sensitive scheme `Bearer`.
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(AuthError::no_header)?;

    let value = value.to_str().map_err(|_| {
        AuthError::malformed_header("Authorization header must be a bearer token.")
    })?;

    let parts: Vec<&str> = value.split(' ').collect();

    match parts.as_slice() {
        [scheme, token] if *scheme == BEARER && !token.is_empty() => Ok(*token),
        [scheme, ..] if *scheme != BEARER => Err(AuthError::malformed_header(
            "Authorization header must start with \"Bearer\".",
        )),
        [_] => Err(AuthError::malformed_header("Token not found.")),
        _ => Err(AuthError::malformed_header(
            "Authorization header must be a bearer token.",
        )),
    }
}
