//! Stack assembly
//!
//! A stack is a named, independently deployable bundle of resource
//! descriptions plus its deployment outputs. Stacks compose through handles:
//! the shared infrastructure stack owns the network, cluster, load balancer,
//! and log group, and dependent stacks either receive those handles or
//! create their own defaults (see [`crate::slot`]).
//!
//! - [`shared`] - Shared infrastructure stack
//! - [`identity`] - Identity broker stack
//! - [`application`] - Application stack with edge authentication
//! - [`fronted`] - The load-balancer-fronted service composer both feature
//!   stacks are built on

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::DeployEnvironment;
use crate::resource::{
    ClusterHandle, ContainerCluster, LoadBalancer, LoadBalancerHandle, LogGroup, LogGroupHandle,
    Network, NetworkHandle, Resource, ValueOrRef, ValueSource,
};
use crate::slot::Slot;
use crate::{Error, Result};

pub mod application;
pub mod fronted;
pub mod identity;
pub mod shared;

pub use application::{ApplicationConfig, ApplicationStack};
pub use fronted::{EdgeAuth, FrontedService, FrontedServiceSpec};
pub use identity::{IdentityBrokerConfig, IdentityBrokerStack};
pub use shared::SharedInfraStack;

// =============================================================================
// Stack
// =============================================================================

/// Deployment output exposed by a stack
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    /// What the output carries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Output value
    #[serde(flatten)]
    pub value: ValueOrRef,
}

impl Output {
    /// Output carrying a resource attribute resolved at deploy time
    pub fn attribute(
        description: impl Into<String>,
        resource: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            description: Some(description.into()),
            value: ValueOrRef::ValueFrom(ValueSource::attribute(resource, attribute)),
        }
    }
}

/// Named, independently deployable bundle of resource descriptions
///
/// Resources are keyed by logical name; the map is ordered so manifests
/// serialize deterministically. The deployment engine owns provisioning
/// order within and across stacks.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Stack {
    /// Stack name, also the manifest file name
    pub name: String,
    /// Deployment identity the stack is instantiated against
    pub environment: DeployEnvironment,
    /// Resources keyed by logical name
    pub resources: BTreeMap<String, Resource>,
    /// Deployment outputs keyed by name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

impl Stack {
    /// Create an empty stack
    pub fn new(name: impl Into<String>, environment: DeployEnvironment) -> Self {
        Self {
            name: name.into(),
            environment,
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    /// Declare a resource under a logical name
    ///
    /// Logical names are unique within a stack; a duplicate is a
    /// composition bug surfaced as a validation error.
    pub fn add(&mut self, name: impl Into<String>, resource: impl Into<Resource>) -> Result<()> {
        let name = name.into();
        if self.resources.contains_key(&name) {
            return Err(Error::validation(format!(
                "stack '{}' already contains a resource named '{name}'",
                self.name
            )));
        }
        self.resources.insert(name, resource.into());
        Ok(())
    }

    /// Expose a deployment output
    pub fn add_output(&mut self, name: impl Into<String>, output: Output) {
        self.outputs.insert(name.into(), output);
    }

    /// Look up a resource by logical name
    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    /// Number of resources declared in this stack
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Number of resources of one kind
    pub fn count_kind(&self, kind: &str) -> usize {
        self.resources.values().filter(|r| r.kind() == kind).count()
    }
}

// =============================================================================
// Handle Resolution
// =============================================================================

/// The four shareable slots every stack resolves at the start of its build
///
/// Defaults to creating everything, which is what a stack deployed in
/// isolation wants.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SharedHandles {
    /// Network boundary slot
    pub network: Slot<NetworkHandle>,
    /// Container cluster slot
    pub cluster: Slot<ClusterHandle>,
    /// Load balancer slot
    pub load_balancer: Slot<LoadBalancerHandle>,
    /// Log group slot
    pub log_group: Slot<LogGroupHandle>,
}

/// Handles after resolution: every slot filled, defaults created
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedHandles {
    /// Network boundary
    pub network: NetworkHandle,
    /// Container cluster
    pub cluster: ClusterHandle,
    /// Load balancer
    pub load_balancer: LoadBalancerHandle,
    /// Log group
    pub log_group: LogGroupHandle,
}

/// Resolve the shareable slots for a stack under construction
///
/// Each `CreateDefault` slot emits exactly one default resource named
/// `<prefix>-<resource>` into the stack; provided handles emit nothing. The
/// default cluster is placed in whichever network the network slot resolved
/// to, provided or created.
pub fn resolve_handles(
    stack: &mut Stack,
    handles: SharedHandles,
    prefix: &str,
) -> Result<ResolvedHandles> {
    let mut created: Vec<(String, Resource)> = Vec::new();

    let network = handles.network.resolve(|| {
        let name = format!("{prefix}-network");
        created.push((name.clone(), Network::default().into()));
        NetworkHandle::new(name)
    });

    let cluster = handles.cluster.resolve(|| {
        let name = format!("{prefix}-cluster");
        created.push((
            name.clone(),
            ContainerCluster {
                network: network.clone(),
            }
            .into(),
        ));
        ClusterHandle::new(name)
    });

    let load_balancer = handles.load_balancer.resolve(|| {
        let name = format!("{prefix}-load-balancer");
        created.push((name.clone(), LoadBalancer::internet_facing().into()));
        LoadBalancerHandle::new(name)
    });

    let log_group = handles.log_group.resolve(|| {
        let name = format!("{prefix}-log-group");
        created.push((name.clone(), LogGroup::one_week().into()));
        LogGroupHandle::new(name)
    });

    for (name, resource) in created {
        stack.add(name, resource)?;
    }

    Ok(ResolvedHandles {
        network,
        cluster,
        load_balancer,
        log_group,
    })
}
