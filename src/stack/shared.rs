//! Shared infrastructure stack
//!
//! The leaf stack of the composition: it owns the network boundary, the
//! container cluster, the internet-facing load balancer, and the log group,
//! and exposes them as handles for the identity broker and application
//! stacks to build on. It takes no inputs beyond the deployment identity
//! and has no failure modes of its own - provider failures surface through
//! the deployment engine, not here.

use crate::config::DeployEnvironment;
use crate::resource::{ClusterHandle, LoadBalancerHandle, LogGroupHandle, NetworkHandle};
use crate::slot::Slot;
use crate::stack::{resolve_handles, ResolvedHandles, SharedHandles, Stack};
use crate::Result;

/// Stack owning the infrastructure the feature stacks share
#[derive(Clone, Debug)]
pub struct SharedInfraStack {
    stack: Stack,
    handles: ResolvedHandles,
}

impl SharedInfraStack {
    /// Name of the shared infrastructure stack
    pub const STACK_NAME: &'static str = "service";

    /// Build the shared infrastructure stack
    pub fn build(environment: DeployEnvironment) -> Result<Self> {
        let mut stack = Stack::new(Self::STACK_NAME, environment);
        let handles = resolve_handles(&mut stack, SharedHandles::default(), Self::STACK_NAME)?;
        Ok(Self { stack, handles })
    }

    /// Handle to the network boundary
    pub fn network(&self) -> &NetworkHandle {
        &self.handles.network
    }

    /// Handle to the container cluster
    pub fn cluster(&self) -> &ClusterHandle {
        &self.handles.cluster
    }

    /// Handle to the load balancer
    pub fn load_balancer(&self) -> &LoadBalancerHandle {
        &self.handles.load_balancer
    }

    /// Handle to the log group
    pub fn log_group(&self) -> &LogGroupHandle {
        &self.handles.log_group
    }

    /// All four handles as provided slots, ready to pass to a dependent stack
    pub fn handles(&self) -> SharedHandles {
        SharedHandles {
            network: Slot::Provided(self.handles.network.clone()),
            cluster: Slot::Provided(self.handles.cluster.clone()),
            load_balancer: Slot::Provided(self.handles.load_balancer.clone()),
            log_group: Slot::Provided(self.handles.log_group.clone()),
        }
    }

    /// Borrow the underlying stack
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Take the underlying stack for synthesis
    pub fn into_stack(self) -> Stack {
        self.stack
    }
}
