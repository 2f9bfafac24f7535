//! Middleware modules for request processing.
//!
//! - [`auth`]: permission extractors guarding the drinks routes
//!
//! # Authorization Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//! 2. A `Require*` extractor hands the headers to the shared [`coffeeshop_auth::Authorizer`]
//! 3. The token is verified against the identity provider's signing keys
//! 4. Handler executes only if the token grants the extractor's permission
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::RequireDrinksCreate;
//!
//! async fn create_drink(
//!     RequireDrinksCreate(claims): RequireDrinksCreate,
//! ) -> impl IntoResponse {
//!     // Only executes if the token carries "post:drinks"
//! }
//! ```

pub mod auth;
