//! Identity broker stack
//!
//! Stands up the self-hosted OpenID Connect provider: a managed relational
//! database with a generated master credential, the broker container service
//! fronted by an HTTPS listener at `keycloak.<domain>`, and the
//! least-privilege rule that lets the broker - and nothing else - reach the
//! database. The database is destroyed with the stack; broker state is
//! reproducible, not durable.

use crate::config::{require_domain, DeployEnvironment};
use crate::resource::{
    DatabaseEngine, Direction, EnvVar, GeneratedSecret, ImageSource, InstanceClass,
    LoadBalancer, ManagedDatabase, MasterUser, NetworkRule, PortRange, RemovalPolicy, RulePeer,
    SecretRef, ZoneRef,
};
use crate::stack::fronted::{compile_fronted_service, FrontedServiceSpec};
use crate::stack::{resolve_handles, Output, SharedHandles, Stack};
use crate::Result;

/// Configuration for the identity broker stack
#[derive(Clone, Debug)]
pub struct IdentityBrokerConfig {
    /// Public base domain; the broker is served at `keycloak.<domain>`
    pub domain: String,
    /// Database created for the broker on first boot
    pub database_name: String,
    /// Master database username
    pub database_user: String,
    /// Broker container image
    pub image: ImageSource,
    /// Generate the broker admin username and password as managed secrets
    pub generate_admin_credentials: bool,
    /// Shared infrastructure handles, created if absent
    pub handles: SharedHandles,
}

impl IdentityBrokerConfig {
    /// Configuration with defaults: local image build, no generated admin
    /// credentials, everything created fresh
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            database_name: "keycloak".to_string(),
            database_user: "admin".to_string(),
            image: ImageSource::local("keycloak"),
            generate_admin_credentials: false,
            handles: SharedHandles::default(),
        }
    }

    /// Use shared infrastructure handles
    pub fn with_handles(mut self, handles: SharedHandles) -> Self {
        self.handles = handles;
        self
    }

    /// Override the broker image
    pub fn with_image(mut self, image: ImageSource) -> Self {
        self.image = image;
        self
    }

    /// Generate admin credentials as managed secrets
    pub fn with_admin_credentials(mut self, generate: bool) -> Self {
        self.generate_admin_credentials = generate;
        self
    }

    /// Override the database name
    pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = name.into();
        self
    }

    /// Override the master database username
    pub fn with_database_user(mut self, user: impl Into<String>) -> Self {
        self.database_user = user.into();
        self
    }

    /// Fully qualified domain the broker is served at
    pub fn broker_fqdn(&self) -> String {
        format!("{}.{}", crate::BROKER_SUBDOMAIN, self.domain)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        require_domain("broker domain", &self.domain)?;
        if self.database_name.is_empty() {
            return Err(crate::Error::validation("database name must not be empty"));
        }
        if self.database_user.is_empty() {
            return Err(crate::Error::validation("database user must not be empty"));
        }
        Ok(())
    }
}

/// The identity broker stack
#[derive(Clone, Debug)]
pub struct IdentityBrokerStack {
    stack: Stack,
}

impl IdentityBrokerStack {
    /// Name of the identity broker stack
    pub const STACK_NAME: &'static str = "keycloak";

    /// Output carrying the load balancer's public DNS name
    pub const DNS_NAME_OUTPUT: &'static str = "loadBalancerDnsName";

    /// Build the identity broker stack
    pub fn build(environment: DeployEnvironment, config: IdentityBrokerConfig) -> Result<Self> {
        config.validate()?;

        let mut stack = Stack::new(Self::STACK_NAME, environment);
        let handles = resolve_handles(&mut stack, config.handles.clone(), Self::STACK_NAME)?;

        let database_secret = "keycloak-database-secret";
        stack.add(
            database_secret,
            GeneratedSecret::new("Keycloak database password"),
        )?;

        let database = "keycloak-database";
        stack.add(
            database,
            ManagedDatabase {
                engine: DatabaseEngine::AuroraMysql,
                instance_class: InstanceClass::BurstableSmall,
                instances: 1,
                master_user: MasterUser {
                    username: config.database_user.clone(),
                    password: SecretRef {
                        secret: database_secret.to_string(),
                    },
                },
                default_database: config.database_name.clone(),
                network: handles.network.clone(),
                removal_policy: RemovalPolicy::Destroy,
            },
        )?;

        // Database coordinates reach the broker only as references: the
        // password through the secret store, the endpoint hostname once the
        // cluster exists.
        let mut env = vec![
            EnvVar::literal("DB_VENDOR", "mysql"),
            EnvVar::literal("DB_USER", &config.database_user),
            EnvVar::from_attribute("DB_ADDR", database, ManagedDatabase::ENDPOINT_ATTRIBUTE),
            EnvVar::literal("DB_DATABASE", &config.database_name),
            EnvVar::from_secret("DB_PASSWORD", database_secret),
            EnvVar::literal("PROXY_ADDRESS_FORWARDING", "true"),
        ];

        if config.generate_admin_credentials {
            let admin_user_secret = "keycloak-admin-user-secret";
            let admin_password_secret = "keycloak-admin-password-secret";
            stack.add(
                admin_user_secret,
                GeneratedSecret::new("Keycloak admin username"),
            )?;
            stack.add(
                admin_password_secret,
                GeneratedSecret::new("Keycloak admin password"),
            )?;
            env.push(EnvVar::from_secret("KEYCLOAK_USER", admin_user_secret));
            env.push(EnvVar::from_secret("KEYCLOAK_PASSWORD", admin_password_secret));
        }

        let fronted = compile_fronted_service(
            &mut stack,
            &handles,
            FrontedServiceSpec::new(
                "keycloak",
                config.image.clone(),
                config.broker_fqdn(),
                ZoneRef::lookup(&config.domain),
            )
            .with_health_check_path(crate::DISCOVERY_PATH)
            .with_env(env),
        )?;

        stack.add(
            "keycloak-database-ingress",
            NetworkRule {
                direction: Direction::Ingress,
                endpoint: RulePeer::Database {
                    database: database.to_string(),
                },
                peer: RulePeer::Service {
                    service: fronted.service,
                },
                ports: PortRange::tcp(crate::DATABASE_PORT),
                description: "From Keycloak service".to_string(),
            },
        )?;

        stack.add_output(
            Self::DNS_NAME_OUTPUT,
            Output::attribute(
                "Public DNS name of the identity broker load balancer",
                handles.load_balancer.name(),
                LoadBalancer::DNS_NAME_ATTRIBUTE,
            ),
        );

        Ok(Self { stack })
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
