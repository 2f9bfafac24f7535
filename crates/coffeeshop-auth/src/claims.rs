//! Decoded token payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `aud` claim, which identity providers emit as a string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::One(aud) => aud == audience,
            Audience::Many(auds) => auds.iter().any(|aud| aud == audience),
        }
    }
}

/// Claims of a verified access token.
///
/// `permissions` stays optional so a token that carries no permission concept at
/// all can be told apart from one whose permissions are merely insufficient.
/// Any claim not modelled here is kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (caller identity at the identity provider)
    pub sub: String,
    pub iss: String,
    pub aud: Audience,
    /// Expiration timestamp (Unix seconds)
    pub exp: u64,
    /// Issued-at timestamp (Unix seconds)
    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_ref()
            .is_some_and(|granted| granted.iter().any(|p| p == permission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_claims_deserialize_with_permissions() {
        let claims: Claims = serde_json::from_value(json!({
            "sub": "auth0|barista",
            "iss": "https://coffee.eu.auth0.com/",
            "aud": ["drinks", "https://coffee.eu.auth0.com/userinfo"],
            "exp": 9999999999u64,
            "iat": 1700000000u64,
            "azp": "client-id",
            "permissions": ["get:drinks-detail"]
        }))
        .unwrap();

        assert_eq!(claims.sub, "auth0|barista");
        assert!(claims.aud.contains("drinks"));
        assert_eq!(claims.iat, Some(1700000000));
        assert_eq!(
            claims.permissions,
            Some(vec!["get:drinks-detail".to_string()])
        );
        assert_eq!(claims.extra.get("azp"), Some(&json!("client-id")));
    }

    #[test]
    fn test_claims_without_permissions_field() {
        let claims: Claims = serde_json::from_value(json!({
            "sub": "auth0|guest",
            "iss": "https://coffee.eu.auth0.com/",
            "aud": "drinks",
            "exp": 9999999999u64
        }))
        .unwrap();

        assert!(claims.permissions.is_none());
        assert!(!claims.has_permission("get:drinks-detail"));
        assert_eq!(claims.aud, Audience::One("drinks".to_string()));
    }

    #[test]
    fn test_has_permission_is_exact_match() {
        let claims: Claims = serde_json::from_value(json!({
            "sub": "auth0|manager",
            "iss": "https://coffee.eu.auth0.com/",
            "aud": "drinks",
            "exp": 9999999999u64,
            "permissions": ["post:drinks", "get:drinks-detail"]
        }))
        .unwrap();

        assert!(claims.has_permission("post:drinks"));
        assert!(claims.has_permission("get:drinks-detail"));
        assert!(!claims.has_permission("post:drink"));
        assert!(!claims.has_permission("POST:DRINKS"));
    }

    #[test]
    fn test_claims_roundtrip_keeps_extra_claims() {
        let value = json!({
            "sub": "auth0|barista",
            "iss": "https://coffee.eu.auth0.com/",
            "aud": "drinks",
            "exp": 9999999999u64,
            "iat": 1700000000u64,
            "scope": "openid profile",
            "permissions": []
        });
        let claims: Claims = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&claims).unwrap(), value);
    }
}
