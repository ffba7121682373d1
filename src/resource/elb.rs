//! Load balancer, listener, and target group types
//!
//! The listener is where edge authentication happens: its default action
//! either forwards straight to a target group or wraps that forward in an
//! authenticate-OIDC step. There is deliberately no way to express a
//! pass-through fallback for unauthenticated requests - the type removes
//! that transition from the state machine.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{LoadBalancerHandle, SecretString};
use crate::oidc::OidcEndpoints;

/// Application-layer protocol for listeners and target groups
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Protocol {
    /// Plain HTTP (backend side)
    Http,
    /// HTTPS (edge side)
    Https,
}

/// Internet-facing load balancer
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancer {
    /// Whether the balancer has a public address
    pub internet_facing: bool,
}

impl LoadBalancer {
    /// Attribute carrying the balancer's public DNS name
    pub const DNS_NAME_ATTRIBUTE: &'static str = "dnsName";

    /// Public, internet-facing balancer
    pub fn internet_facing() -> Self {
        Self {
            internet_facing: true,
        }
    }
}

/// Health-check policy for a target group
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckPolicy {
    /// Protocol the checks use
    pub protocol: Protocol,
    /// Path probed on each backend
    pub path: String,
    /// Port probed on each backend
    pub port: u16,
    /// Seconds before a single check is considered failed
    pub timeout_seconds: u32,
    /// Consecutive successes to mark a target healthy
    pub healthy_threshold: u32,
    /// Consecutive failures to mark a target unhealthy
    pub unhealthy_threshold: u32,
    /// Seconds between checks
    pub interval_seconds: u32,
}

impl HealthCheckPolicy {
    /// The conservative policy both feature stacks share
    ///
    /// Slow failure detection over false positives: a slow-starting backend
    /// must not be flapped out of service by an impatient checker.
    pub fn conservative(path: impl Into<String>, port: u16) -> Self {
        Self {
            protocol: Protocol::Http,
            path: path.into(),
            port,
            timeout_seconds: crate::HEALTH_CHECK_TIMEOUT_SECS,
            healthy_threshold: crate::HEALTHY_THRESHOLD,
            unhealthy_threshold: crate::UNHEALTHY_THRESHOLD,
            interval_seconds: crate::HEALTH_CHECK_INTERVAL_SECS,
        }
    }
}

/// Cookie-based session stickiness for a target group
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StickinessPolicy {
    /// Seconds a client stays bound to the same backend
    pub cookie_duration_seconds: u64,
}

impl StickinessPolicy {
    /// 24-hour stickiness used by both feature stacks
    pub fn daily() -> Self {
        Self {
            cookie_duration_seconds: crate::SESSION_COOKIE_DURATION_SECS,
        }
    }
}

/// Set of backends a listener forwards traffic to
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TargetGroup {
    /// Backend protocol
    pub protocol: Protocol,
    /// Backend port
    pub port: u16,
    /// Health-check policy
    pub health_check: HealthCheckPolicy,
    /// Session stickiness policy
    pub stickiness: StickinessPolicy,
}

/// Fallback policy for requests arriving without a valid session
///
/// There is no pass-through variant: an unauthenticated request is either
/// challenged or denied, never forwarded.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum OnUnauthenticated {
    /// Redirect to the authorization endpoint (the OIDC challenge)
    #[default]
    Authenticate,
    /// Reject the request outright
    Deny,
}

/// OIDC authentication step performed by the load balancer itself
///
/// The balancer runs the full code flow server-side: challenge, code
/// exchange at the token endpoint, user-info fetch - then hands the request
/// to the `next` action.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateOidc {
    /// The four provider endpoints
    pub endpoints: OidcEndpoints,
    /// OIDC client identifier
    pub client_id: String,
    /// OIDC client secret
    pub client_secret: SecretString,
    /// Requested scope
    pub scope: String,
    /// Policy for requests without a valid session
    pub on_unauthenticated: OnUnauthenticated,
    /// Action taken once the request is authenticated
    pub next: Box<ListenerAction>,
}

/// Action a listener applies to matched requests
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ListenerAction {
    /// Forward to a target group
    #[serde(rename_all = "camelCase")]
    Forward {
        /// Logical name of the target group
        target_group: String,
    },
    /// Authenticate against an OIDC provider, then continue
    AuthenticateOidc(AuthenticateOidc),
}

impl ListenerAction {
    /// Forward to a target group by logical name
    pub fn forward(target_group: impl Into<String>) -> Self {
        Self::Forward {
            target_group: target_group.into(),
        }
    }

    /// Wrap a forward in an authenticate-OIDC step
    ///
    /// Unauthenticated requests are always challenged.
    pub fn authenticate_oidc(
        endpoints: OidcEndpoints,
        client_id: impl Into<String>,
        client_secret: SecretString,
        scope: impl Into<String>,
        next: ListenerAction,
    ) -> Self {
        Self::AuthenticateOidc(AuthenticateOidc {
            endpoints,
            client_id: client_id.into(),
            client_secret,
            scope: scope.into(),
            on_unauthenticated: OnUnauthenticated::Authenticate,
            next: Box::new(next),
        })
    }
}

/// HTTPS listener routing traffic on a load balancer
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    /// Balancer the listener is attached to
    pub load_balancer: LoadBalancerHandle,
    /// Listener port
    pub port: u16,
    /// Listener protocol
    pub protocol: Protocol,
    /// Logical name of the certificate bound to the listener
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    /// Default action for all requests
    pub default_action: ListenerAction,
}
