//! Permission strings and the permission check.
//!
//! # Example
//!
//! ```ignore
//! use coffeeshop_auth::permissions::{self, check_permission};
//!
//! check_permission(&claims, permissions::DRINKS_CREATE)?;
//! ```

use coffeeshop_core::AuthError;

use crate::claims::Claims;

/// Permission to read the long representation of drinks
pub const DRINKS_DETAIL: &str = "get:drinks-detail";
/// Permission to create drinks
pub const DRINKS_CREATE: &str = "post:drinks";
/// Permission to update drinks
pub const DRINKS_UPDATE: &str = "patch:drinks";
/// Permission to delete drinks
pub const DRINKS_DELETE: &str = "delete:drinks";

/// Confirms `claims` grant exactly `required`.
///
/// # Errors
///
/// - `invalid_claims` when the token has no `permissions` claim at all
/// - `unauthorized` when the claim is present but lacks `required`
pub fn check_permission(claims: &Claims, required: &str) -> Result<(), AuthError> {
    let granted = claims
        .permissions
        .as_ref()
        .ok_or_else(|| AuthError::invalid_claims("Permissions not included in JWT."))?;

    if !granted.iter().any(|permission| permission == required) {
        return Err(AuthError::unauthorized("Permission not found."));
    }

    Ok(())
}
