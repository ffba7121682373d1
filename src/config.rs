//! Entry-point configuration
//!
//! Everything a synthesis run needs arrives through these structs: the
//! deployment identity every stack is instantiated against, and the identity
//! provider settings the application stack wires into its listener. Missing
//! required values are fatal before any stack is built.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::resource::SecretString;
use crate::{Error, Result};

/// Account and region every stack is deployed against
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeployEnvironment {
    /// Account identifier
    pub account: String,
    /// Region identifier
    pub region: String,
}

impl DeployEnvironment {
    /// Create a deployment identity
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            region: region.into(),
        }
    }
}

/// Identity provider settings consumed by the application stack
///
/// The provider must expose the Keycloak-style realm path layout; any
/// OIDC-compliant provider with that shape works. The broker stack this
/// crate synthesizes is one such provider, but nothing requires using it.
#[derive(Clone, Debug)]
pub struct IdentityProviderSettings {
    /// OIDC client identifier
    pub client_id: String,
    /// OIDC client secret
    pub client_secret: SecretString,
    /// Base URL of the provider, e.g. `https://keycloak.example.com`
    pub base_url: String,
    /// Realm the client is registered in
    pub realm: String,
    /// Scope requested at the edge
    pub scope: String,
}

impl IdentityProviderSettings {
    /// Create settings with the default client id and scope
    pub fn new(
        client_secret: SecretString,
        base_url: impl Into<String>,
        realm: impl Into<String>,
    ) -> Self {
        Self {
            client_id: crate::DEFAULT_CLIENT_ID.to_string(),
            client_secret,
            base_url: base_url.into(),
            realm: realm.into(),
            scope: crate::DEFAULT_SCOPE.to_string(),
        }
    }

    /// Override the client identifier
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Override the requested scope
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::validation(
                "identity provider base URL must start with http:// or https://",
            ));
        }
        if self.realm.is_empty() || self.realm.contains('/') {
            return Err(Error::validation(
                "identity provider realm must be a non-empty path segment",
            ));
        }
        if self.client_id.is_empty() {
            return Err(Error::validation("identity provider client id must not be empty"));
        }
        Ok(())
    }
}

/// Validate a DNS domain configuration field
pub(crate) fn require_domain(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::validation(format!("{field} must not be empty")));
    }
    if value.contains('/') || value.contains(' ') || value.contains("://") {
        return Err(Error::validation(format!(
            "{field} must be a bare domain name, got '{value}'"
        )));
    }
    if value.starts_with('.') || value.ends_with('.') {
        return Err(Error::validation(format!(
            "{field} must not start or end with a dot, got '{value}'"
        )));
    }
    Ok(())
}
