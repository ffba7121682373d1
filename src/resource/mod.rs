//! Typed cloud resource descriptions
//!
//! This module tree defines the manifest dialect Palisade emits: every
//! resource a stack declares is a plain serde struct with camelCase wire
//! names, collected under a logical name inside a stack manifest. The
//! deployment engine consuming the manifest owns provisioning order,
//! rollback, and all runtime behavior.
//!
//! - [`network`] - Network boundaries and least-privilege network rules
//! - [`service`] - Container clusters, services, task roles, log groups
//! - [`database`] - Managed relational databases
//! - [`dns`] - Zone references, certificates, alias records
//! - [`elb`] - Load balancers, listeners, target groups, listener actions
//!
//! For stack assembly, use [`crate::stack`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod database;
pub mod dns;
pub mod elb;
pub mod network;
pub mod service;

pub use database::{DatabaseEngine, InstanceClass, ManagedDatabase, MasterUser};
pub use dns::{Certificate, DnsRecord, ZoneRef};
pub use elb::{
    AuthenticateOidc, HealthCheckPolicy, Listener, ListenerAction, LoadBalancer,
    OnUnauthenticated, Protocol, StickinessPolicy, TargetGroup,
};
pub use network::{
    Direction, Network, NetworkRule, PortRange, RulePeer, SubnetTopology, TransportProtocol,
};
pub use service::{
    ContainerCluster, ContainerService, EnvVar, ImageSource, LogDriver, LogGroup,
    ServicePrincipal, TaskRole, TaskSpec,
};

// =============================================================================
// Handles
// =============================================================================
// Handles are weak references: a name under which a resource is known, not
// control over it. A dependent stack holding a handle may attach
// sub-resources (listeners, records, rules) but never redefines the
// resource itself.

/// Handle to a network boundary
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(transparent)]
pub struct NetworkHandle(String);

/// Handle to a container cluster
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(transparent)]
pub struct ClusterHandle(String);

/// Handle to a load balancer
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(transparent)]
pub struct LoadBalancerHandle(String);

/// Handle to a log group
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(transparent)]
pub struct LogGroupHandle(String);

macro_rules! impl_handle {
    ($($handle:ident),+ $(,)?) => {
        $(
            impl $handle {
                /// Create a handle from a resource's logical name
                pub fn new(name: impl Into<String>) -> Self {
                    Self(name.into())
                }

                /// The logical name this handle refers to
                pub fn name(&self) -> &str {
                    &self.0
                }
            }
        )+
    };
}

impl_handle!(NetworkHandle, ClusterHandle, LoadBalancerHandle, LogGroupHandle);

// =============================================================================
// Values and References
// =============================================================================

/// A literal value or a reference resolved by the deployment engine
///
/// References defer resolution to deploy time: a generated secret's value or
/// another resource's attribute (such as a database endpoint hostname) does
/// not exist at synthesis time.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ValueOrRef {
    /// Inline literal
    Value(String),
    /// Deferred reference
    ValueFrom(ValueSource),
}

impl ValueOrRef {
    /// Returns true if this is a deferred reference rather than a literal
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::ValueFrom(_))
    }
}

/// Source for a deferred value
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValueSource {
    /// The value of a generated secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<SecretRef>,
    /// An attribute of another resource, known only after provisioning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_ref: Option<AttributeRef>,
}

impl ValueSource {
    /// Reference the value of a generated secret by logical name
    pub fn secret(name: impl Into<String>) -> Self {
        Self {
            secret_ref: Some(SecretRef {
                secret: name.into(),
            }),
            attribute_ref: None,
        }
    }

    /// Reference an attribute of another resource by logical name
    pub fn attribute(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            secret_ref: None,
            attribute_ref: Some(AttributeRef {
                resource: resource.into(),
                attribute: attribute.into(),
            }),
        }
    }
}

/// Reference to a generated secret's value
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
    /// Logical name of the secret resource
    pub secret: String,
}

/// Reference to an attribute of a provisioned resource
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttributeRef {
    /// Logical name of the referenced resource or handle
    pub resource: String,
    /// Attribute name, e.g. `endpointHostname` or `dnsName`
    pub attribute: String,
}

// =============================================================================
// Secrets
// =============================================================================

/// A secret value supplied at synthesis time
///
/// Lands in the manifest for the deployment engine but is redacted from
/// debug output and logs.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    /// Wrap a secret value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the underlying value
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString(***)")
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A secret generated by the managed secret facility
///
/// The value never appears in source or manifest; the engine generates it at
/// provisioning time and resources reference it via [`SecretRef`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSecret {
    /// Human-readable description of what the secret protects
    pub description: String,
    /// Exclude punctuation from the generated value
    ///
    /// Generated values are interpolated into shell and container
    /// environments; punctuation would require quoting the engine does not
    /// guarantee.
    pub exclude_punctuation: bool,
}

impl GeneratedSecret {
    /// Create a generated secret description
    ///
    /// Punctuation is always excluded from generated values.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            exclude_punctuation: true,
        }
    }
}

// =============================================================================
// Shared policies
// =============================================================================

/// What happens to a resource when its stack is torn down
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum RemovalPolicy {
    /// Delete the resource with the stack
    #[default]
    Destroy,
    /// Keep the resource after the stack is gone
    Retain,
}

// =============================================================================
// Resource
// =============================================================================

/// Any resource a stack can declare
///
/// Serialized with an internal `kind` tag so each manifest entry reads as
/// `{"kind": "ManagedDatabase", ...fields}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(tag = "kind")]
#[allow(clippy::large_enum_variant)]
pub enum Resource {
    /// Isolated virtual network
    Network(Network),
    /// Container orchestration cluster
    ContainerCluster(ContainerCluster),
    /// Retention-bounded log sink
    LogGroup(LogGroup),
    /// Internet-facing load balancer
    LoadBalancer(LoadBalancer),
    /// HTTPS listener on a load balancer
    Listener(Listener),
    /// Backend target group with health-check and stickiness policy
    TargetGroup(TargetGroup),
    /// Desired-count-managed container service
    ContainerService(ContainerService),
    /// Least-privilege identity for container tasks
    TaskRole(TaskRole),
    /// Secret generated by the managed secret facility
    GeneratedSecret(GeneratedSecret),
    /// Managed relational database cluster
    ManagedDatabase(ManagedDatabase),
    /// DNS-validated TLS certificate
    Certificate(Certificate),
    /// Alias record in a pre-existing zone
    DnsRecord(DnsRecord),
    /// Least-privilege network rule
    NetworkRule(NetworkRule),
}

impl Resource {
    /// The kind tag this resource serializes under
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "Network",
            Self::ContainerCluster(_) => "ContainerCluster",
            Self::LogGroup(_) => "LogGroup",
            Self::LoadBalancer(_) => "LoadBalancer",
            Self::Listener(_) => "Listener",
            Self::TargetGroup(_) => "TargetGroup",
            Self::ContainerService(_) => "ContainerService",
            Self::TaskRole(_) => "TaskRole",
            Self::GeneratedSecret(_) => "GeneratedSecret",
            Self::ManagedDatabase(_) => "ManagedDatabase",
            Self::Certificate(_) => "Certificate",
            Self::DnsRecord(_) => "DnsRecord",
            Self::NetworkRule(_) => "NetworkRule",
        }
    }
}

macro_rules! impl_into_resource {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        $(
            impl From<$ty> for Resource {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

impl_into_resource!(
    Network(Network),
    ContainerCluster(ContainerCluster),
    LogGroup(LogGroup),
    LoadBalancer(LoadBalancer),
    Listener(Listener),
    TargetGroup(TargetGroup),
    ContainerService(ContainerService),
    TaskRole(TaskRole),
    GeneratedSecret(GeneratedSecret),
    ManagedDatabase(ManagedDatabase),
    Certificate(Certificate),
    DnsRecord(DnsRecord),
    NetworkRule(NetworkRule),
);
