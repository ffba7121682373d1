//! DNS zone references, certificates, and alias records
//!
//! Zones are consumed, never created: a `ZoneRef` names a pre-existing
//! hosted zone the deployment engine resolves by domain lookup. Certificates
//! are domain-validated against that zone via DNS records.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::LoadBalancerHandle;

/// Reference to a pre-existing hosted DNS zone, resolved by domain lookup
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRef {
    /// Apex domain of the zone, e.g. `example.com`
    pub domain: String,
}

impl ZoneRef {
    /// Look up a zone by its apex domain
    pub fn lookup(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }
}

/// DNS-validated TLS certificate bound to one listener
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    /// Fully qualified domain the certificate covers
    pub domain_name: String,
    /// Zone the validation records are written into
    pub zone: ZoneRef,
}

/// Alias record pointing a name at a load balancer
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecord {
    /// Fully qualified record name
    pub name: String,
    /// Zone the record is written into
    pub zone: ZoneRef,
    /// Load balancer the record aliases
    pub alias_to: LoadBalancerHandle,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Story: certificates bind a subdomain to its validation zone
    #[test]
    fn story_certificate_wire_shape() {
        let certificate = Certificate {
            domain_name: "keycloak.example.com".to_string(),
            zone: ZoneRef::lookup("example.com"),
        };

        let json = serde_json::to_value(&certificate).unwrap();
        assert_eq!(json["domainName"], "keycloak.example.com");
        assert_eq!(json["zone"]["domain"], "example.com");
    }

    /// Story: alias records point a subdomain at the balancer handle
    #[test]
    fn story_alias_record_wire_shape() {
        let record = DnsRecord {
            name: "app.example.com".to_string(),
            zone: ZoneRef::lookup("example.com"),
            alias_to: LoadBalancerHandle::new("service-load-balancer"),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["aliasTo"], "service-load-balancer");
    }
}
