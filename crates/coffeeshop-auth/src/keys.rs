//! Signing-key material for token verification.
//!
//! A [`KeySource`] knows where public keys live: a pre-provisioned JSON Web Key Set
//! ([`StaticKeySource`]) or the identity provider's JWKS endpoint
//! ([`RemoteKeySource`]). [`KeyStore`] sits in front of a source and caches every
//! usable key of each fetched set by key id for the lifetime of the process.
//!
//! ## Unknown key ids
//!
//! A miss refetches the whole set, but at most once per refresh interval
//! ([`DEFAULT_REFRESH_INTERVAL`]). Within the interval an unknown id fails
//! without touching the source. Failed fetches do not start the interval.
//!
//! ## Concurrency
//!
//! The cache is read-mostly. Lookups share a read lock; on a miss the source is
//! consulted with no lock held and the result inserted under a short write lock.
//! Requests racing on the same missing key id may each fetch; the first
//! insert wins.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::JwkSet;
use reqwest::Client;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use coffeeshop_core::AuthError;

const UNKNOWN_KEY: &str = "Unable to find the appropriate key.";

/// Minimum time between two key set fetches triggered by unknown key ids.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum KeySourceError {
    #[error("failed to read key set from {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to fetch key set: {0}")]
    Fetch(String),
    #[error("failed to parse key set: {0}")]
    Parse(String),
}

/// Somewhere the current set of public signing keys can be loaded from.
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn fetch_keys(&self) -> Result<JwkSet, KeySourceError>;
}

/// Keys provisioned up front; never touches the network.
#[derive(Debug, Clone)]
pub struct StaticKeySource {
    keys: JwkSet,
}

impl StaticKeySource {
    pub fn new(keys: JwkSet) -> Self {
        Self { keys }
    }

    pub fn from_json(json: &str) -> Result<Self, KeySourceError> {
        serde_json::from_str(json)
            .map(Self::new)
            .map_err(|e| KeySourceError::Parse(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, KeySourceError> {
        let json = std::fs::read_to_string(path).map_err(|source| KeySourceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn fetch_keys(&self) -> Result<JwkSet, KeySourceError> {
        Ok(self.keys.clone())
    }
}

/// Fetches the key set from the identity provider's JWKS endpoint.
///
/// A failed request is retried once; a second failure is returned to the caller.
#[derive(Debug, Clone)]
pub struct RemoteKeySource {
    client: Client,
    url: String,
}

impl RemoteKeySource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, KeySourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KeySourceError::Fetch(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_key_set(&self) -> Result<JwkSet, KeySourceError> {
        match self.request_key_set().await {
            Ok(keys) => Ok(keys),
            Err(first) => {
                warn!(url = %self.url, error = %first, "Signing key fetch failed, retrying once");
                self.request_key_set().await
            }
        }
    }

    async fn request_key_set(&self) -> Result<JwkSet, KeySourceError> {
        info!(url = %self.url, "Fetching signing keys");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| KeySourceError::Fetch(e.to_string()))?;

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| KeySourceError::Parse(e.to_string()))
    }
}

#[async_trait]
impl KeySource for RemoteKeySource {
    async fn fetch_keys(&self) -> Result<JwkSet, KeySourceError> {
        self.fetch_key_set().await
    }
}

#[derive(Default)]
struct KeyCache {
    keys: HashMap<String, DecodingKey>,
    refreshed_at: Option<Instant>,
}

impl KeyCache {
    fn refreshed_within(&self, interval: Duration) -> bool {
        self.refreshed_at
            .is_some_and(|refreshed_at| refreshed_at.elapsed() < interval)
    }
}

/// Process-wide cache of decoding keys in front of a [`KeySource`].
#[derive(Clone)]
pub struct KeyStore {
    source: Arc<dyn KeySource>,
    cache: Arc<RwLock<KeyCache>>,
    refresh_interval: Duration,
}

impl KeyStore {
    pub fn new(source: Arc<dyn KeySource>) -> Self {
        Self {
            source,
            cache: Arc::new(RwLock::new(KeyCache::default())),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    pub fn with_refresh_interval(mut self, refresh_interval: Duration) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    /// Returns the decoding key for `kid`, consulting the source only on a cache miss.
    ///
    /// # Errors
    ///
    /// `invalid_header` when the source fails or its key set has no usable key for
    /// `kid`, and immediately, without a fetch, for ids still unknown after a
    /// refresh less than one refresh interval ago.
    pub async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(key) = cache.keys.get(kid) {
                debug!(kid = %kid, "Using cached signing key");
                return Ok(key.clone());
            }
            if cache.refreshed_within(self.refresh_interval) {
                debug!(kid = %kid, "Unknown kid, key set refreshed recently");
                return Err(AuthError::invalid_header(UNKNOWN_KEY));
            }
        }

        let set = self.source.fetch_keys().await.map_err(|e| {
            warn!(kid = %kid, error = %e, "Failed to fetch signing keys");
            AuthError::invalid_header(UNKNOWN_KEY)
        })?;
        let fetched = usable_keys(&set);

        let mut cache = self.cache.write().await;
        for (id, key) in fetched {
            cache.keys.entry(id).or_insert(key);
        }
        cache.refreshed_at = Some(Instant::now());
        info!(cached_keys = cache.keys.len(), "Signing keys refreshed");

        cache.keys.get(kid).cloned().ok_or_else(|| {
            debug!(kid = %kid, "No signing key for kid");
            AuthError::invalid_header(UNKNOWN_KEY)
        })
    }

    pub async fn cached_key_count(&self) -> usize {
        self.cache.read().await.keys.len()
    }
}

/// Keys without an id, or that cannot verify signatures, are skipped.
fn usable_keys(set: &JwkSet) -> Vec<(String, DecodingKey)> {
    set.keys
        .iter()
        .filter_map(|jwk| {
            let kid = jwk.common.key_id.clone()?;
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => Some((kid, key)),
                Err(e) => {
                    warn!(kid = %kid, error = %e, "Unusable signing key");
                    None
                }
            }
        })
        .collect()
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore").finish_non_exhaustive()
    }
}
