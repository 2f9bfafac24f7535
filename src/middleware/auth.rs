use axum::http::request::Parts;

use coffeeshop_auth::Claims;
use coffeeshop_core::AppError;

use crate::metrics::track_auth_failure;
use crate::state::AppState;

/// Runs the authorization gate for `permission` against the request headers.
///
/// Failures are counted by kind and returned as the matching 401/403 error.
pub async fn authorize(
    parts: &Parts,
    state: &AppState,
    permission: &str,
) -> Result<Claims, AppError> {
    state
        .authorizer
        .authorize(&parts.headers, permission)
        .await
        .map_err(|err| {
            track_auth_failure(err.kind.as_str());
            AppError::from(err)
        })
}

/// Helper macro to create permission check extractors.
///
/// The generated extractor rejects the request before the handler runs unless
/// the bearer token is valid and grants exactly `$permission`.
#[macro_export]
macro_rules! require_permission {
    ($name:ident, $permission:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub coffeeshop_auth::Claims);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = coffeeshop_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let claims =
                    $crate::middleware::auth::authorize(parts, state, $permission).await?;
                Ok($name(claims))
            }
        }
    };
}

// Drinks permissions
require_permission!(
    RequireDrinksDetail,
    coffeeshop_auth::permissions::DRINKS_DETAIL
);
require_permission!(RequireDrinksCreate, coffeeshop_auth::permissions::DRINKS_CREATE);
require_permission!(RequireDrinksUpdate, coffeeshop_auth::permissions::DRINKS_UPDATE);
require_permission!(RequireDrinksDelete, coffeeshop_auth::permissions::DRINKS_DELETE);
