//! Load-balancer-fronted container service composer
//!
//! Both feature stacks put a container service behind an HTTPS listener the
//! same way: a dedicated task role, a DNS-validated certificate and alias
//! record for the service's subdomain, a target group with the shared
//! conservative health-check and stickiness policy, and a listener whose
//! default action forwards to that target group - optionally behind an
//! authenticate-OIDC step. This module is that pattern, written once.

use crate::oidc::OidcEndpoints;
use crate::resource::{
    Certificate, ContainerService, DnsRecord, EnvVar, HealthCheckPolicy, ImageSource, Listener,
    ListenerAction, LogDriver, Protocol, SecretString, StickinessPolicy, TargetGroup, TaskRole,
    TaskSpec, ZoneRef,
};
use crate::stack::{ResolvedHandles, Stack};
use crate::Result;

/// Edge authentication settings for a fronted service
///
/// When present, the listener's default action authenticates every request
/// against the provider before forwarding; unauthenticated requests are
/// always challenged, never passed through.
#[derive(Clone, Debug)]
pub struct EdgeAuth {
    /// The four OIDC endpoints
    pub endpoints: OidcEndpoints,
    /// OIDC client identifier
    pub client_id: String,
    /// OIDC client secret
    pub client_secret: SecretString,
    /// Requested scope
    pub scope: String,
}

/// Specification for one fronted service
#[derive(Clone, Debug)]
pub struct FrontedServiceSpec {
    /// Base name resources are derived from, e.g. `keycloak`
    pub name: String,
    /// Container image
    pub image: ImageSource,
    /// Fully qualified public domain, e.g. `keycloak.example.com`
    pub domain_name: String,
    /// Pre-existing zone the certificate and record go into
    pub zone: ZoneRef,
    /// Environment variables for the container
    pub env: Vec<EnvVar>,
    /// Health-check path on the container
    pub health_check_path: String,
    /// Edge authentication, if any
    pub edge_auth: Option<EdgeAuth>,
    /// Port the container listens on
    pub container_port: u16,
    /// Task CPU units
    pub cpu: u32,
    /// Task memory in MiB
    pub memory_mib: u32,
    /// Containers the orchestrator keeps running
    pub desired_count: u32,
}

impl FrontedServiceSpec {
    /// Create a spec with the default sizing and a root-path health check
    pub fn new(
        name: impl Into<String>,
        image: ImageSource,
        domain_name: impl Into<String>,
        zone: ZoneRef,
    ) -> Self {
        Self {
            name: name.into(),
            image,
            domain_name: domain_name.into(),
            zone,
            env: Vec::new(),
            health_check_path: "/".to_string(),
            edge_auth: None,
            container_port: crate::CONTAINER_PORT,
            cpu: crate::DEFAULT_TASK_CPU,
            memory_mib: crate::DEFAULT_TASK_MEMORY_MIB,
            desired_count: crate::DEFAULT_DESIRED_COUNT,
        }
    }

    /// Set the container environment
    pub fn with_env(mut self, env: Vec<EnvVar>) -> Self {
        self.env = env;
        self
    }

    /// Set the health-check path
    pub fn with_health_check_path(mut self, path: impl Into<String>) -> Self {
        self.health_check_path = path.into();
        self
    }

    /// Authenticate requests at the edge before forwarding
    pub fn with_edge_auth(mut self, auth: EdgeAuth) -> Self {
        self.edge_auth = Some(auth);
        self
    }
}

/// Logical names of the resources a fronted service is made of
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrontedService {
    /// Container service
    pub service: String,
    /// Target group
    pub target_group: String,
    /// HTTPS listener
    pub listener: String,
    /// Certificate
    pub certificate: String,
    /// Task role
    pub role: String,
    /// Alias record
    pub record: String,
}

/// Compile a fronted service into a stack
///
/// Emits the task role, certificate, alias record, target group, container
/// service, and listener, wired to the resolved handles. Returns the logical
/// names for callers that attach further resources (network rules, outputs).
pub fn compile_fronted_service(
    stack: &mut Stack,
    handles: &ResolvedHandles,
    spec: FrontedServiceSpec,
) -> Result<FrontedService> {
    let names = FrontedService {
        service: format!("{}-service", spec.name),
        target_group: format!("{}-target-group", spec.name),
        listener: format!("{}-listener", spec.name),
        certificate: format!("{}-certificate", spec.name),
        role: format!("{}-task-role", spec.name),
        record: format!("{}-dns-record", spec.name),
    };

    stack.add(&names.role, TaskRole::container_tasks())?;

    stack.add(
        &names.certificate,
        Certificate {
            domain_name: spec.domain_name.clone(),
            zone: spec.zone.clone(),
        },
    )?;

    stack.add(
        &names.record,
        DnsRecord {
            name: spec.domain_name,
            zone: spec.zone,
            alias_to: handles.load_balancer.clone(),
        },
    )?;

    stack.add(
        &names.target_group,
        TargetGroup {
            protocol: Protocol::Http,
            port: spec.container_port,
            health_check: HealthCheckPolicy::conservative(
                spec.health_check_path,
                spec.container_port,
            ),
            stickiness: StickinessPolicy::daily(),
        },
    )?;

    stack.add(
        &names.service,
        ContainerService {
            cluster: handles.cluster.clone(),
            task: TaskSpec {
                image: spec.image,
                cpu: spec.cpu,
                memory_mib: spec.memory_mib,
                container_port: spec.container_port,
                role: names.role.clone(),
                env: spec.env,
                logging: LogDriver {
                    stream_prefix: spec.name,
                    log_group: handles.log_group.clone(),
                },
            },
            desired_count: spec.desired_count,
            target_group: names.target_group.clone(),
        },
    )?;

    let forward = ListenerAction::forward(&names.target_group);
    let default_action = match spec.edge_auth {
        Some(auth) => ListenerAction::authenticate_oidc(
            auth.endpoints,
            auth.client_id,
            auth.client_secret,
            auth.scope,
            forward,
        ),
        None => forward,
    };

    stack.add(
        &names.listener,
        Listener {
            load_balancer: handles.load_balancer.clone(),
            port: crate::HTTPS_PORT,
            protocol: Protocol::Https,
            certificate: Some(names.certificate.clone()),
            default_action,
        },
    )?;

    Ok(names)
}
