use std::env;
use std::path::PathBuf;

use crate::{env_or, split_list};

/// Settings for verifying bearer tokens issued by the external identity provider.
///
/// # Environment Variables
///
/// - `AUTH0_DOMAIN`: identity provider domain, e.g. `coffee.eu.auth0.com` (required;
///   the token issuer and the remote key set are both derived from it)
/// - `API_AUDIENCE`: expected `aud` claim
/// - `AUTH_ALGORITHMS`: comma separated signing algorithms (default: `RS256`)
/// - `JWKS_FILE`: optional path to a pre-provisioned JSON Web Key Set; when set,
///   keys are never fetched over the network
/// - `JWKS_FETCH_TIMEOUT_SECS`: timeout for the remote key set request (default: 5)
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub domain: String,
    pub audience: String,
    pub algorithms: Vec<String>,
    pub jwks_file: Option<PathBuf>,
    pub jwks_fetch_timeout_secs: u64,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let algorithms = split_list(
            &env::var("AUTH_ALGORITHMS").unwrap_or_else(|_| "RS256".to_string()),
        );

        Self {
            domain: env::var("AUTH0_DOMAIN").unwrap_or_default(),
            audience: env::var("API_AUDIENCE").unwrap_or_else(|_| "drinks".to_string()),
            algorithms,
            jwks_file: env::var("JWKS_FILE").ok().map(PathBuf::from),
            jwks_fetch_timeout_secs: env_or("JWKS_FETCH_TIMEOUT_SECS", 5),
        }
    }

    /// Expected `iss` claim.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain.trim_end_matches('/'))
    }

    pub fn jwks_url(&self) -> String {
        format!("{}.well-known/jwks.json", self.issuer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(domain: &str) -> AuthConfig {
        AuthConfig {
            domain: domain.to_string(),
            audience: "drinks".to_string(),
            algorithms: vec!["RS256".to_string()],
            jwks_file: None,
            jwks_fetch_timeout_secs: 5,
        }
    }

    #[test]
    fn test_issuer_has_trailing_slash() {
        assert_eq!(
            config("coffee.eu.auth0.com").issuer(),
            "https://coffee.eu.auth0.com/"
        );
        assert_eq!(
            config("coffee.eu.auth0.com/").issuer(),
            "https://coffee.eu.auth0.com/"
        );
    }

    #[test]
    fn test_jwks_url() {
        assert_eq!(
            config("coffee.eu.auth0.com").jwks_url(),
            "https://coffee.eu.auth0.com/.well-known/jwks.json"
        );
    }
}
