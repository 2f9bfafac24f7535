//! # Coffee Shop Config
//!
//! Configuration types for the Coffee Shop API, loaded from environment variables:
//!
//! - [`auth`]: identity provider domain, audience, algorithms and signing-key source
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`database`]: PostgreSQL connection settings
//! - [`server`]: listen addresses for the API and metrics servers
//!
//! # Example
//!
//! ```ignore
//! use coffeeshop_config::{AuthConfig, CorsConfig, DatabaseConfig, ServerConfig};
//!
//! let auth_config = AuthConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! ```

pub mod auth;
pub mod cors;
pub mod database;
pub mod server;

// Re-export commonly used types at crate root
pub use auth::AuthConfig;
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Reads an environment variable and parses it, falling back to `default`
/// when it is unset or unparsable.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Splits a comma separated list, dropping blanks.
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
