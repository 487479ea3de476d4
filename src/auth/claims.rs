// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Decoded JWT claims.

use serde::{Deserialize, Serialize};

/// `aud` may be a single string or a list (Auth0 adds the userinfo audience
/// when the `openid` scope is requested).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::Single(aud) => aud == audience,
            Audience::Multiple(auds) => auds.iter().any(|aud| aud == audience),
        }
    }
}

/// Claims carried by an Auth0 access token.
///
/// Signature, `exp`, `aud` and `iss` are validated by the verifier before a
/// value of this type is handed to a handler. The registered claims default
/// when absent so that a missing one surfaces as a validation failure rather
/// than a decode failure. Claims that are not modelled here are kept in
/// `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer (`https://{domain}/`)
    #[serde(default)]
    pub iss: String,

    /// Audience (the API identifier)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,

    /// Expiration timestamp
    #[serde(default)]
    pub exp: u64,

    /// Subject (Auth0 user ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,

    /// Authorized party (client ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,

    /// Space-separated OAuth scopes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// RBAC permissions granted to the token. `None` when the API does not
    /// have "Add Permissions in the Access Token" enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_auth0_access_token_payload() {
        let claims: Claims = serde_json::from_value(json!({
            "iss": "https://casting.eu.auth0.com/",
            "sub": "auth0|5e490a907ef9b10f04fe90ac",
            "aud": "casting",
            "iat": 1581848520,
            "exp": 1581934920,
            "azp": "CMycesvryw8Qxg3HXK3MLFBoMu7dzBlC",
            "scope": "",
            "permissions": ["get:actors", "get:movies"]
        }))
        .unwrap();

        assert_eq!(claims.sub.as_deref(), Some("auth0|5e490a907ef9b10f04fe90ac"));
        assert!(claims.aud.unwrap().contains("casting"));
        assert_eq!(
            claims.permissions,
            Some(vec!["get:actors".to_string(), "get:movies".to_string()])
        );
        assert!(claims.extra.is_empty());
    }

    #[test]
    fn absent_permissions_stay_absent() {
        let claims: Claims = serde_json::from_value(json!({
            "iss": "https://casting.eu.auth0.com/",
            "aud": "casting",
            "exp": 1
        }))
        .unwrap();

        assert!(claims.permissions.is_none());
    }

    #[test]
    fn audience_list_and_unknown_claims() {
        let claims: Claims = serde_json::from_value(json!({
            "iss": "https://casting.eu.auth0.com/",
            "aud": ["casting", "https://casting.eu.auth0.com/userinfo"],
            "exp": 1,
            "https://casting.example/roles": ["producer"]
        }))
        .unwrap();

        let aud = claims.aud.unwrap();
        assert!(aud.contains("casting"));
        assert!(!aud.contains("other"));
        assert!(claims.extra.contains_key("https://casting.example/roles"));
    }
}
