//! Network boundary and network rule types
//!
//! A `Network` is an isolated virtual network with a public/private subnet
//! split; a `NetworkRule` grants one specific path between two endpoints.
//! Rules are least-privilege wiring: nothing reaches a database or leaves a
//! load balancer without a rule naming the path.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::LoadBalancerHandle;

/// Isolated virtual network with public and private subnets
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    /// Subnet layout
    pub subnet_topology: SubnetTopology,
}

/// Subnet layout for a network boundary
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum SubnetTopology {
    /// Public subnets for edge resources, private subnets for services
    #[default]
    PublicPrivate,
    /// Public subnets only
    PublicOnly,
}

/// Direction of a network rule relative to its endpoint
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Traffic arriving at the endpoint
    Ingress,
    /// Traffic leaving the endpoint
    Egress,
}

/// One side of a network rule
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RulePeer {
    /// A container service declared in the same stack
    #[serde(rename_all = "camelCase")]
    Service {
        /// Logical name of the service
        service: String,
    },
    /// A managed database declared in the same stack
    #[serde(rename_all = "camelCase")]
    Database {
        /// Logical name of the database
        database: String,
    },
    /// A load balancer, referenced by handle
    #[serde(rename_all = "camelCase")]
    LoadBalancer {
        /// Handle of the load balancer
        load_balancer: LoadBalancerHandle,
    },
    /// Any IPv4 destination
    AnyIpv4,
}

/// Transport protocol of a port range
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum TransportProtocol {
    /// TCP
    Tcp,
    /// UDP
    Udp,
}

/// Contiguous port range with a transport protocol
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortRange {
    /// First port in the range
    pub from_port: u16,
    /// Last port in the range
    pub to_port: u16,
    /// Transport protocol
    pub protocol: TransportProtocol,
}

impl PortRange {
    /// Single TCP port
    pub fn tcp(port: u16) -> Self {
        Self {
            from_port: port,
            to_port: port,
            protocol: TransportProtocol::Tcp,
        }
    }
}

/// Least-privilege network rule between two endpoints
///
/// The rule is attached to `endpoint` and permits traffic in `direction`
/// to or from `peer` on `ports`. Anything not named by a rule stays closed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRule {
    /// Direction relative to the endpoint
    pub direction: Direction,
    /// The endpoint this rule is attached to
    pub endpoint: RulePeer,
    /// The permitted peer
    pub peer: RulePeer,
    /// Permitted ports
    pub ports: PortRange,
    /// Why this path exists
    pub description: String,
}
