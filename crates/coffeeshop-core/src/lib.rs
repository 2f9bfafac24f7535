//! # Coffee Shop Core
//!
//! Error types shared by every crate of the Coffee Shop API.
//!
//! - [`errors::AuthError`]: the authorization failure taxonomy
//! - [`errors::AppError`]: the application error rendered as the JSON error envelope
//!
//! # Example
//!
//! ```ignore
//! use coffeeshop_core::{AppError, AuthError};
//!
//! let error: AppError = AuthError::unauthorized("Permission not found.").into();
//! assert_eq!(error.status.as_u16(), 403);
//! ```

pub mod errors;

pub use errors::{AppError, AuthError, AuthErrorKind, ErrorResponse};
