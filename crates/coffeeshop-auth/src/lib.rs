//! # Coffee Shop Auth
//!
//! Bearer token authorization for the Coffee Shop API.
//!
//! Tokens are issued by an external identity provider; this crate only verifies
//! them. A protected operation runs only after three steps succeed, in order:
//!
//! 1. [`header::extract_token`] pulls the token out of `Authorization: Bearer <token>`
//! 2. [`jwt::TokenVerifier::verify_and_decode`] checks signature, expiry, issuer and
//!    audience against signing keys from a [`keys::KeySource`], cached per key id
//! 3. [`permissions::check_permission`] confirms the claims grant the required permission
//!
//! [`Authorizer`] bundles the three steps into a single gate.
//!
//! # Example
//!
//! ```ignore
//! use coffeeshop_auth::{Authorizer, permissions};
//! use coffeeshop_config::AuthConfig;
//!
//! let authorizer = Authorizer::from_config(&AuthConfig::from_env())?;
//!
//! let drinks = authorizer
//!     .requires_auth(&headers, permissions::DRINKS_DETAIL, |claims| async move {
//!         load_drinks_for(claims.sub).await
//!     })
//!     .await?;
//! ```

pub mod authorizer;
pub mod claims;
pub mod header;
pub mod jwt;
pub mod keys;
pub mod permissions;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types at crate root
pub use authorizer::Authorizer;
pub use claims::{Audience, Claims};
pub use header::extract_token;
pub use jwt::TokenVerifier;
pub use keys::{KeySource, KeySourceError, KeyStore, RemoteKeySource, StaticKeySource};
pub use permissions::check_permission;
