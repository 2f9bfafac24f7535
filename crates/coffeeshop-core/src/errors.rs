use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error as ThisError;
use tracing::error;
use utoipa::ToSchema;

/// The ways an authorization check can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    /// No `Authorization` header on the request.
    NoHeader,
    /// Header present but not of the form `Bearer <token>`.
    MalformedHeader,
    /// Token unparsable, unverifiable, or signed with an unknown key.
    InvalidHeader,
    /// Expiration claim lies in the past.
    TokenExpired,
    /// Issuer or audience mismatch, or no permissions claim at all.
    InvalidClaims,
    /// The required permission is not granted by the token.
    Unauthorized,
}

impl AuthErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorKind::NoHeader => "no_header",
            AuthErrorKind::MalformedHeader => "malformed_header",
            AuthErrorKind::InvalidHeader => "invalid_header",
            AuthErrorKind::TokenExpired => "token_expired",
            AuthErrorKind::InvalidClaims => "invalid_claims",
            AuthErrorKind::Unauthorized => "unauthorized",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthErrorKind::Unauthorized => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl std::fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed authorization check, carrying its kind and a human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("{description}")]
pub struct AuthError {
    pub kind: AuthErrorKind,
    pub description: String,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }

    pub fn no_header() -> Self {
        Self::new(AuthErrorKind::NoHeader, "Authorization header is expected.")
    }

    pub fn malformed_header(description: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::MalformedHeader, description)
    }

    pub fn invalid_header(description: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::InvalidHeader, description)
    }

    pub fn token_expired() -> Self {
        Self::new(AuthErrorKind::TokenExpired, "Token expired.")
    }

    pub fn invalid_claims(description: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::InvalidClaims, description)
    }

    pub fn unauthorized(description: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::Unauthorized, description)
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }
}

/// JSON error envelope returned for every failed request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    /// HTTP status code, repeated in the body
    pub error: u16,
    pub message: String,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    /// The authorization failure behind this error, if any.
    pub fn auth_error(&self) -> Option<&AuthError> {
        self.error.downcast_ref::<AuthError>()
    }

    fn message(&self) -> String {
        if self.status.is_server_error() {
            "internal server error".to_string()
        } else {
            self.error.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status.as_u16(), error = ?self.error, "Request failed");
        }

        let body = Json(ErrorResponse {
            success: false,
            error: self.status.as_u16(),
            message: self.message(),
        });

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        let error = err.into();
        let status = match error.downcast_ref::<AuthError>() {
            Some(auth) => auth.status(),
            None => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError { status, error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(AuthError::no_header().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::malformed_header("bad").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::invalid_header("bad").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::token_expired().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::invalid_claims("bad").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::unauthorized("nope").status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_auth_error_kind_codes() {
        assert_eq!(AuthErrorKind::NoHeader.as_str(), "no_header");
        assert_eq!(AuthErrorKind::MalformedHeader.as_str(), "malformed_header");
        assert_eq!(AuthErrorKind::InvalidHeader.as_str(), "invalid_header");
        assert_eq!(AuthErrorKind::TokenExpired.as_str(), "token_expired");
        assert_eq!(AuthErrorKind::InvalidClaims.as_str(), "invalid_claims");
        assert_eq!(AuthErrorKind::Unauthorized.to_string(), "unauthorized");
    }

    #[test]
    fn test_app_error_from_auth_error_keeps_status() {
        let error: AppError = AuthError::unauthorized("Permission not found.").into();
        assert_eq!(error.status, StatusCode::FORBIDDEN);
        assert_eq!(
            error.auth_error().map(|e| e.kind),
            Some(AuthErrorKind::Unauthorized)
        );
    }

    #[test]
    fn test_app_error_from_other_error_is_internal() {
        let error: AppError = std::io::Error::other("disk on fire").into();
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.auth_error().is_none());
    }

    #[tokio::test]
    async fn test_auth_error_envelope() {
        let error: AppError = AuthError::token_expired().into();
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], 401);
        assert_eq!(body["message"], "Token expired.");
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = AppError::internal(anyhow!("connection refused")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], 500);
        assert_eq!(body["message"], "internal server error");
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let response = AppError::not_found(anyhow!("drink not found")).into_response();
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], 404);
        assert_eq!(body["message"], "drink not found");
    }
}
