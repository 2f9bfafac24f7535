//! Token signature and claim verification.
//!
//! Verification is pure: given the same token and the same key material it always
//! yields the same [`Claims`]. The only I/O is a key set fetch on a key cache miss,
//! which [`KeyStore`] caches and throttles.

use std::str::FromStr;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Validation, decode, decode_header};
use tracing::debug;

use coffeeshop_config::AuthConfig;
use coffeeshop_core::AuthError;

use crate::claims::Claims;
use crate::keys::KeyStore;

const INCORRECT_CLAIMS: &str = "Incorrect claims. Please, check the audience and issuer.";
const UNPARSABLE_TOKEN: &str = "Unable to parse authentication token.";

#[derive(Debug, Clone)]
pub struct TokenVerifier {
    keys: KeyStore,
    validation: Validation,
}

impl TokenVerifier {
    /// Builds a verifier that accepts only the configured algorithms, issuer and audience.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity provider domain is unset, or if no algorithm
    /// is configured or one of them is unknown.
    pub fn new(keys: KeyStore, config: &AuthConfig) -> anyhow::Result<Self> {
        if config.domain.trim().is_empty() {
            anyhow::bail!("AUTH0_DOMAIN must be set to validate the token issuer");
        }

        let algorithms = config
            .algorithms
            .iter()
            .map(|name| {
                Algorithm::from_str(name)
                    .map_err(|_| anyhow::anyhow!("unsupported signing algorithm: {name}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let first = algorithms
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("at least one signing algorithm is required"))?;

        let mut validation = Validation::new(first);
        validation.algorithms = algorithms;
        validation.set_issuer(&[config.issuer()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = 0;

        Ok(Self { keys, validation })
    }

    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    /// Verifies `token` and returns its claims.
    ///
    /// # Errors
    ///
    /// - `invalid_header`: unparsable token, missing or unknown key id, bad signature,
    ///   disallowed algorithm
    /// - `token_expired`: `exp` is in the past
    /// - `invalid_claims`: issuer or audience mismatch
    pub async fn verify_and_decode(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| {
            debug!(error = %e, "Failed to decode token header");
            AuthError::invalid_header(UNPARSABLE_TOKEN)
        })?;

        let kid = header
            .kid
            .ok_or_else(|| AuthError::invalid_header("Authorization malformed."))?;

        let key = self.keys.decoding_key(&kid).await?;

        decode::<Claims>(token, &key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(kid = %kid, error = %e, "Token validation failed");
                classify(e.kind())
            })
    }
}

fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::ExpiredSignature => AuthError::token_expired(),
        ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
            AuthError::invalid_claims(INCORRECT_CLAIMS)
        }
        ErrorKind::MissingRequiredClaim(claim) if matches!(claim.as_str(), "iss" | "aud") => {
            AuthError::invalid_claims(INCORRECT_CLAIMS)
        }
        _ => AuthError::invalid_header(UNPARSABLE_TOKEN),
    }
}
