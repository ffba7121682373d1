//! Managed relational database types
//!
//! The database is exclusive to the stack that declares it and is destroyed
//! with it. The master credential is a generated secret; no password ever
//! appears in a manifest.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{NetworkHandle, RemovalPolicy, SecretRef};

/// Database engine family
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum DatabaseEngine {
    /// MySQL-compatible managed cluster engine
    AuroraMysql,
}

/// Instance sizing for database nodes
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum InstanceClass {
    /// Burstable, small - sized for light load
    #[serde(rename = "burstable-small")]
    BurstableSmall,
    /// Burstable, medium
    #[serde(rename = "burstable-medium")]
    BurstableMedium,
}

/// Master credential for a database cluster
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MasterUser {
    /// Master username
    pub username: String,
    /// Generated master password
    pub password: SecretRef,
}

/// Provisioned relational cluster
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagedDatabase {
    /// Engine family
    pub engine: DatabaseEngine,
    /// Node sizing
    pub instance_class: InstanceClass,
    /// Number of instances in the cluster
    pub instances: u32,
    /// Master credential
    pub master_user: MasterUser,
    /// Database created on first boot
    pub default_database: String,
    /// Network the cluster is placed in
    pub network: NetworkHandle,
    /// Teardown behavior - Destroy trades durability for reproducibility
    pub removal_policy: RemovalPolicy,
}

impl ManagedDatabase {
    /// Attribute carrying the cluster's connection endpoint hostname
    pub const ENDPOINT_ATTRIBUTE: &'static str = "endpointHostname";
}
