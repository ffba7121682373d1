//! OIDC endpoint derivation
//!
//! The edge listener performs the OpenID Connect flow against four endpoints
//! that are fully determined by the identity provider's base URL and realm.
//! The path convention is the Keycloak realm layout, but any OIDC-compliant
//! provider exposing the same shape works.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The four OIDC endpoints an authenticating listener needs
///
/// Derived purely from `(base_url, realm)`; no other inputs participate.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OidcEndpoints {
    /// Authorization endpoint the client is redirected to for login
    pub authorization_endpoint: String,
    /// Token endpoint where the authorization code is exchanged
    pub token_endpoint: String,
    /// User-info endpoint queried after the token exchange
    pub user_info_endpoint: String,
    /// Issuer identifier expected in returned tokens
    pub issuer: String,
}

impl OidcEndpoints {
    /// Derive the endpoint set for a realm hosted at `base_url`
    ///
    /// Trailing slashes on `base_url` are normalized away so that
    /// `https://idp.example.com` and `https://idp.example.com/` produce
    /// identical endpoint URLs.
    pub fn for_realm(base_url: &str, realm: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let realm_root = format!("{base}/auth/realms/{realm}");
        Self {
            authorization_endpoint: format!("{realm_root}/protocol/openid-connect/auth"),
            token_endpoint: format!("{realm_root}/protocol/openid-connect/token"),
            user_info_endpoint: format!("{realm_root}/protocol/openid-connect/userinfo"),
            issuer: realm_root,
        }
    }
}
