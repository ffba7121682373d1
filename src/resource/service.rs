//! Container cluster, service, and logging types
//!
//! A `ContainerService` is a desired-count-managed set of containers the
//! orchestrator continuously reconciles. The service references its cluster
//! and log group by handle and registers into a target group declared in the
//! same stack.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{ClusterHandle, LogGroupHandle, NetworkHandle, RemovalPolicy, ValueOrRef, ValueSource};

/// Logical grouping under which container services run
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContainerCluster {
    /// Network the cluster's services run in
    pub network: NetworkHandle,
}

/// Named, retention-bounded log sink
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogGroup {
    /// Days to retain log events
    pub retention_days: u32,
    /// Teardown behavior
    pub removal_policy: RemovalPolicy,
}

impl LogGroup {
    /// One-week retention, destroyed with its stack
    pub fn one_week() -> Self {
        Self {
            retention_days: crate::DEFAULT_LOG_RETENTION_DAYS,
            removal_policy: RemovalPolicy::Destroy,
        }
    }
}

/// Principal a task role can be assumed by
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ServicePrincipal {
    /// The container task runtime
    ContainerTasks,
}

/// Least-privilege identity a container service runs as
///
/// Each service gets its own role; permissions are granted to the role, not
/// shared between services.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskRole {
    /// Who may assume the role
    pub assumed_by: ServicePrincipal,
}

impl TaskRole {
    /// Role assumable by container tasks
    pub fn container_tasks() -> Self {
        Self {
            assumed_by: ServicePrincipal::ContainerTasks,
        }
    }
}

/// Where a container image comes from
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum ImageSource {
    /// Built from a local build context directory
    #[serde(rename_all = "camelCase")]
    Local {
        /// Build context path relative to the project root
        context: String,
    },
    /// Pulled from a registry at a pinned reference
    #[serde(rename_all = "camelCase")]
    Registry {
        /// Full image reference including tag
        reference: String,
    },
}

impl ImageSource {
    /// Image built from a local context directory
    pub fn local(context: impl Into<String>) -> Self {
        Self::Local {
            context: context.into(),
        }
    }

    /// Image pulled from a registry
    pub fn registry(reference: impl Into<String>) -> Self {
        Self::Registry {
            reference: reference.into(),
        }
    }
}

/// Environment variable for a container
///
/// The value is either a literal or a deferred reference; secrets and
/// provisioned attributes are always wired as references, never inlined.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    /// Variable name
    pub name: String,
    /// Variable value
    #[serde(flatten)]
    pub value: ValueOrRef,
}

impl EnvVar {
    /// Literal environment variable
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ValueOrRef::Value(value.into()),
        }
    }

    /// Environment variable sourced from a generated secret
    pub fn from_secret(name: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ValueOrRef::ValueFrom(ValueSource::secret(secret)),
        }
    }

    /// Environment variable sourced from a provisioned resource attribute
    pub fn from_attribute(
        name: impl Into<String>,
        resource: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: ValueOrRef::ValueFrom(ValueSource::attribute(resource, attribute)),
        }
    }
}

/// Log driver configuration for a container
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogDriver {
    /// Prefix for log streams emitted by this service
    pub stream_prefix: String,
    /// Log group the streams land in
    pub log_group: LogGroupHandle,
}

/// Task definition for a container service
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    /// Container image
    pub image: ImageSource,
    /// CPU units
    pub cpu: u32,
    /// Memory limit in MiB
    pub memory_mib: u32,
    /// Port the container listens on
    pub container_port: u16,
    /// Logical name of the task role this service runs as
    pub role: String,
    /// Environment variables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    /// Log driver
    pub logging: LogDriver,
}

/// Desired-count-managed container service behind a target group
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContainerService {
    /// Cluster the service runs in
    pub cluster: ClusterHandle,
    /// Task definition
    pub task: TaskSpec,
    /// Number of containers the orchestrator keeps running
    pub desired_count: u32,
    /// Logical name of the target group the service registers into
    pub target_group: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Story: secret-sourced env vars never carry a literal value
    #[test]
    fn story_secret_env_var_is_deferred() {
        let var = EnvVar::from_secret("DB_PASSWORD", "keycloak-database-secret");

        let json = serde_json::to_value(&var).unwrap();
        assert_eq!(json["name"], "DB_PASSWORD");
        assert!(json.get("value").is_none(), "secret value must not be inlined");
        assert_eq!(
            json["valueFrom"]["secretRef"]["secret"],
            "keycloak-database-secret"
        );
    }

    /// Story: env vars flatten the literal value next to the name
    #[test]
    fn story_literal_env_var_wire_shape() {
        let var = EnvVar::literal("DB_VENDOR", "mysql");
        let json = serde_json::to_value(&var).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "DB_VENDOR", "value": "mysql" }));
    }

    /// Story: the two image variants serialize under one tagged shape
    #[test]
    fn story_image_source_variants() {
        let local = ImageSource::local("keycloak");
        let json = serde_json::to_value(&local).unwrap();
        assert_eq!(json, serde_json::json!({ "source": "local", "context": "keycloak" }));

        let registry = ImageSource::registry("quay.io/keycloak/keycloak:24.0");
        let json = serde_json::to_value(&registry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "source": "registry",
                "reference": "quay.io/keycloak/keycloak:24.0"
            })
        );
    }

    /// Story: default log groups keep a week of logs and die with the stack
    #[test]
    fn story_log_group_defaults() {
        let logs = LogGroup::one_week();
        assert_eq!(logs.retention_days, 7);
        assert_eq!(logs.removal_policy, RemovalPolicy::Destroy);
    }
}
