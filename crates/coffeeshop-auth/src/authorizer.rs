use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use tracing::{info, instrument, warn};

use coffeeshop_config::AuthConfig;
use coffeeshop_core::AuthError;

use crate::claims::Claims;
use crate::header::extract_token;
use crate::jwt::TokenVerifier;
use crate::keys::{KeySource, KeyStore, RemoteKeySource, StaticKeySource};
use crate::permissions::check_permission;

/// The authorization gate: header extraction, token verification and the
/// permission check, run in that order and stopping at the first failure.
///
/// Cheap to clone; clones share the signing-key cache.
#[derive(Debug, Clone)]
pub struct Authorizer {
    verifier: TokenVerifier,
}

impl Authorizer {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    /// Builds an authorizer whose keys come from `JWKS_FILE` when configured,
    /// otherwise from the identity provider's JWKS endpoint.
    ///
    /// # Errors
    ///
    /// Fails when `AUTH0_DOMAIN` is unset, the key file cannot be loaded, or the
    /// algorithm list is invalid.
    pub fn from_config(config: &AuthConfig) -> anyhow::Result<Self> {
        if config.domain.trim().is_empty() {
            anyhow::bail!("AUTH0_DOMAIN is not set; cannot derive the token issuer or key set URL");
        }

        let source: Arc<dyn KeySource> = match &config.jwks_file {
            Some(path) => {
                info!(path = %path.display(), "Using pre-provisioned signing keys");
                Arc::new(StaticKeySource::from_file(path)?)
            }
            None => {
                let url = config.jwks_url();
                info!(url = %url, "Using remote signing keys");
                Arc::new(RemoteKeySource::new(
                    url,
                    Duration::from_secs(config.jwks_fetch_timeout_secs),
                )?)
            }
        };

        Self::with_key_source(source, config)
    }

    pub fn with_key_source(source: Arc<dyn KeySource>, config: &AuthConfig) -> anyhow::Result<Self> {
        let verifier = TokenVerifier::new(KeyStore::new(source), config)?;
        Ok(Self::new(verifier))
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Runs the gate and returns the caller's claims.
    #[instrument(skip(self, headers))]
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        permission: &str,
    ) -> Result<Claims, AuthError> {
        let result = self.check(headers, permission).await;

        if let Err(err) = &result {
            warn!(kind = %err.kind, reason = %err.description, "Authorization failed");
        }

        result
    }

    async fn check(&self, headers: &HeaderMap, permission: &str) -> Result<Claims, AuthError> {
        let token = extract_token(headers)?;
        let claims = self.verifier.verify_and_decode(token).await?;
        check_permission(&claims, permission)?;
        Ok(claims)
    }

    /// Runs `operation` with the caller's claims, but only once the gate passes.
    ///
    /// On failure `operation` is dropped without being called and the error is returned.
    pub async fn requires_auth<F, Fut, T>(
        &self,
        headers: &HeaderMap,
        permission: &str,
        operation: F,
    ) -> Result<T, AuthError>
    where
        F: FnOnce(Claims) -> Fut,
        Fut: Future<Output = T>,
    {
        let claims = self.authorize(headers, permission).await?;
        Ok(operation(claims).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{DRINKS_CREATE, DRINKS_DETAIL};
    use crate::testing::{claims_json, sign, test_auth_config, test_authorizer};
    use axum::http::{HeaderValue, header};
    use coffeeshop_core::AuthErrorKind;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_authorize_success() {
        let (authorizer, _) = test_authorizer();
        let token = sign(&claims_json(Some(&[DRINKS_CREATE, DRINKS_DETAIL]), 3600));

        let claims = authorizer
            .authorize(&bearer(&token), DRINKS_DETAIL)
            .await
            .unwrap();
        assert!(claims.has_permission(DRINKS_DETAIL));
    }

    #[tokio::test]
    async fn test_header_checked_before_token() {
        let (authorizer, source) = test_authorizer();

        let err = authorizer
            .authorize(&HeaderMap::new(), DRINKS_DETAIL)
            .await
            .unwrap_err();

        assert_eq!(err.kind, AuthErrorKind::NoHeader);
        assert_eq!(source.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_verification_checked_before_permission() {
        let (authorizer, _) = test_authorizer();
        let token = sign(&claims_json(Some(&[]), -3600));

        let err = authorizer
            .authorize(&bearer(&token), DRINKS_DETAIL)
            .await
            .unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::TokenExpired);
    }

    #[tokio::test]
    async fn test_requires_auth_skips_operation_on_failure() {
        let (authorizer, _) = test_authorizer();
        let token = sign(&claims_json(Some(&[DRINKS_DETAIL]), 3600));
        let ran = AtomicBool::new(false);
        let flag = &ran;

        let result = authorizer
            .requires_auth(&bearer(&token), DRINKS_CREATE, move |_| async move {
                flag.store(true, Ordering::SeqCst);
            })
            .await;

        assert_eq!(result.unwrap_err().kind, AuthErrorKind::Unauthorized);
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_requires_auth_passes_claims() {
        let (authorizer, _) = test_authorizer();
        let token = sign(&claims_json(Some(&[DRINKS_DETAIL]), 3600));

        let subject = authorizer
            .requires_auth(&bearer(&token), DRINKS_DETAIL, |claims| async move {
                claims.sub
            })
            .await
            .unwrap();

        assert_eq!(subject, "auth0|barista");
    }

    #[test]
    fn test_from_config_with_missing_jwks_file() {
        let mut config = test_auth_config();
        config.jwks_file = Some(PathBuf::from("/nonexistent/jwks.json"));
        assert!(Authorizer::from_config(&config).is_err());
    }

    #[test]
    fn test_from_config_without_domain() {
        let mut config = test_auth_config();
        config.domain = String::new();
        let err = Authorizer::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("AUTH0_DOMAIN"));

        config.jwks_file = Some(PathBuf::from("/nonexistent/jwks.json"));
        let err = Authorizer::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("AUTH0_DOMAIN"));
    }

    #[test]
    fn test_from_config_remote() {
        assert!(Authorizer::from_config(&test_auth_config()).is_ok());
    }
}
