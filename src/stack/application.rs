//! Application stack
//!
//! Stands up the user-facing service at `app.<domain>` behind a listener
//! that authenticates every request against an OIDC provider before
//! forwarding. The provider is referenced by configuration only - its
//! endpoints are derived from a base URL and realm, so the broker stack
//! from this crate and any external OIDC-compliant provider are
//! interchangeable.
//!
//! The listener performs the token exchange itself, so the stack also opens
//! the load balancer's TLS egress path to the provider.

use crate::config::{require_domain, DeployEnvironment, IdentityProviderSettings};
use crate::oidc::OidcEndpoints;
use crate::resource::{
    Direction, ImageSource, NetworkRule, PortRange, RulePeer, ZoneRef,
};
use crate::stack::fronted::{compile_fronted_service, EdgeAuth, FrontedServiceSpec};
use crate::stack::{resolve_handles, SharedHandles, Stack};
use crate::Result;

/// Configuration for the application stack
#[derive(Clone, Debug)]
pub struct ApplicationConfig {
    /// Public base domain; the application is served at `app.<domain>`
    pub domain: String,
    /// Identity provider the edge authenticates against
    pub identity_provider: IdentityProviderSettings,
    /// Application container image
    pub image: ImageSource,
    /// Shared infrastructure handles, created if absent
    pub handles: SharedHandles,
}

impl ApplicationConfig {
    /// Configuration with defaults: local image build, everything created
    /// fresh
    pub fn new(domain: impl Into<String>, identity_provider: IdentityProviderSettings) -> Self {
        Self {
            domain: domain.into(),
            identity_provider,
            image: ImageSource::local("application"),
            handles: SharedHandles::default(),
        }
    }

    /// Use shared infrastructure handles
    pub fn with_handles(mut self, handles: SharedHandles) -> Self {
        self.handles = handles;
        self
    }

    /// Override the application image
    pub fn with_image(mut self, image: ImageSource) -> Self {
        self.image = image;
        self
    }

    /// Fully qualified domain the application is served at
    pub fn app_fqdn(&self) -> String {
        format!("{}.{}", crate::APP_SUBDOMAIN, self.domain)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        require_domain("application domain", &self.domain)?;
        self.identity_provider.validate()
    }
}

/// The application stack
#[derive(Clone, Debug)]
pub struct ApplicationStack {
    stack: Stack,
}

impl ApplicationStack {
    /// Name of the application stack
    pub const STACK_NAME: &'static str = "application";

    /// Build the application stack
    pub fn build(environment: DeployEnvironment, config: ApplicationConfig) -> Result<Self> {
        config.validate()?;

        let mut stack = Stack::new(Self::STACK_NAME, environment);
        let handles = resolve_handles(&mut stack, config.handles.clone(), Self::STACK_NAME)?;

        let idp = &config.identity_provider;
        compile_fronted_service(
            &mut stack,
            &handles,
            FrontedServiceSpec::new(
                "application",
                config.image.clone(),
                config.app_fqdn(),
                ZoneRef::lookup(&config.domain),
            )
            .with_edge_auth(EdgeAuth {
                endpoints: OidcEndpoints::for_realm(&idp.base_url, &idp.realm),
                client_id: idp.client_id.clone(),
                client_secret: idp.client_secret.clone(),
                scope: idp.scope.clone(),
            }),
        )?;

        // The balancer, not the application, talks to the token and
        // user-info endpoints.
        stack.add(
            "load-balancer-oidc-egress",
            NetworkRule {
                direction: Direction::Egress,
                endpoint: RulePeer::LoadBalancer {
                    load_balancer: handles.load_balancer.clone(),
                },
                peer: RulePeer::AnyIpv4,
                ports: PortRange::tcp(crate::HTTPS_PORT),
                description: "Allow load balancer to verify tokens".to_string(),
            },
        )?;

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{
        ListenerAction, OnUnauthenticated, Resource, SecretString,
    };
    use crate::stack::{IdentityBrokerConfig, IdentityBrokerStack, SharedInfraStack};

    fn test_env() -> DeployEnvironment {
        DeployEnvironment::new("123456789012", "eu-west-1")
    }

    fn idp() -> IdentityProviderSettings {
        IdentityProviderSettings::new(
            SecretString::new("s3cr3t"),
            "https://idp.example.com",
            "main",
        )
    }

    fn build(config: ApplicationConfig) -> ApplicationStack {
        ApplicationStack::build(test_env(), config).unwrap()
    }

    fn default_action(stack: &ApplicationStack) -> &ListenerAction {
        let Some(Resource::Listener(listener)) = stack.stack().get("application-listener")
        else {
            panic!("expected the application listener");
        };
        &listener.default_action
    }

    // =========================================================================
    // Story: Certificate Follows the Subdomain Convention
    // =========================================================================

    #[test]
    fn story_certificate_covers_app_subdomain() {
        let stack = build(ApplicationConfig::new("example.com", idp()));

        let Some(Resource::Certificate(certificate)) =
            stack.stack().get("application-certificate")
        else {
            panic!("expected a certificate");
        };
        assert_eq!(certificate.domain_name, "app.example.com");
        assert_eq!(certificate.zone.domain, "example.com");
    }

    // =========================================================================
    // Story: Every Request Authenticates Before It Is Forwarded
    // =========================================================================

    #[test]
    fn story_default_action_authenticates_then_forwards() {
        let stack = build(ApplicationConfig::new("example.com", idp()));

        let ListenerAction::AuthenticateOidc(action) = default_action(&stack) else {
            panic!("expected an authenticate-OIDC default action");
        };
        assert_eq!(action.on_unauthenticated, OnUnauthenticated::Authenticate);
        assert_eq!(action.client_id, "my_app");
        assert_eq!(action.scope, "openid");
        assert_eq!(
            *action.next,
            ListenerAction::forward("application-target-group")
        );
    }

    #[test]
    fn story_endpoints_follow_the_realm_convention() {
        let stack = build(ApplicationConfig::new("example.com", idp()));

        let ListenerAction::AuthenticateOidc(action) = default_action(&stack) else {
            panic!("expected an authenticate-OIDC default action");
        };
        assert_eq!(
            action.endpoints.authorization_endpoint,
            "https://idp.example.com/auth/realms/main/protocol/openid-connect/auth"
        );
        assert_eq!(
            action.endpoints.token_endpoint,
            "https://idp.example.com/auth/realms/main/protocol/openid-connect/token"
        );
        assert_eq!(
            action.endpoints.user_info_endpoint,
            "https://idp.example.com/auth/realms/main/protocol/openid-connect/userinfo"
        );
        assert_eq!(
            action.endpoints.issuer,
            "https://idp.example.com/auth/realms/main"
        );
    }

    // =========================================================================
    // Story: The Balancer's Token-Exchange Path Is Opened Explicitly
    // =========================================================================

    #[test]
    fn story_load_balancer_egress_on_tls() {
        let stack = build(ApplicationConfig::new("example.com", idp()));

        let Some(Resource::NetworkRule(rule)) = stack.stack().get("load-balancer-oidc-egress")
        else {
            panic!("expected the egress rule");
        };
        assert_eq!(rule.direction, Direction::Egress);
        assert_eq!(rule.peer, RulePeer::AnyIpv4);
        assert_eq!(rule.ports, PortRange::tcp(443));
    }

    // =========================================================================
    // Story: Policy Parity With the Broker Stack
    // =========================================================================

    #[test]
    fn story_health_check_policy_matches_the_broker() {
        let application = build(ApplicationConfig::new("example.com", idp()));
        let broker =
            IdentityBrokerStack::build(test_env(), IdentityBrokerConfig::new("example.com"))
                .unwrap();

        let Some(Resource::TargetGroup(app_group)) =
            application.stack().get("application-target-group")
        else {
            panic!("expected the application target group");
        };
        let Some(Resource::TargetGroup(broker_group)) =
            broker.stack().get("keycloak-target-group")
        else {
            panic!("expected the broker target group");
        };

        assert_eq!(app_group.health_check.path, "/");
        assert_eq!(
            app_group.health_check.timeout_seconds,
            broker_group.health_check.timeout_seconds
        );
        assert_eq!(
            app_group.health_check.healthy_threshold,
            broker_group.health_check.healthy_threshold
        );
        assert_eq!(
            app_group.health_check.unhealthy_threshold,
            broker_group.health_check.unhealthy_threshold
        );
        assert_eq!(
            app_group.health_check.interval_seconds,
            broker_group.health_check.interval_seconds
        );
        assert_eq!(app_group.stickiness, broker_group.stickiness);
    }

    // =========================================================================
    // Story: Handle Sharing
    // =========================================================================

    #[test]
    fn story_shared_handles_create_no_infrastructure() {
        let shared = SharedInfraStack::build(test_env()).unwrap();
        let stack =
            build(ApplicationConfig::new("example.com", idp()).with_handles(shared.handles()));

        assert_eq!(stack.stack().count_kind("Network"), 0);
        assert_eq!(stack.stack().count_kind("ContainerCluster"), 0);
        assert_eq!(stack.stack().count_kind("LoadBalancer"), 0);
        assert_eq!(stack.stack().count_kind("LogGroup"), 0);
    }

    #[test]
    fn story_standalone_build_creates_its_own_infrastructure() {
        let stack = build(ApplicationConfig::new("example.com", idp()));

        assert_eq!(stack.stack().count_kind("Network"), 1);
        assert_eq!(stack.stack().count_kind("ContainerCluster"), 1);
        assert_eq!(stack.stack().count_kind("LoadBalancer"), 1);
        assert_eq!(stack.stack().count_kind("LogGroup"), 1);
    }

    // =========================================================================
    // Story: Validation
    // =========================================================================

    #[test]
    fn story_invalid_identity_provider_is_rejected() {
        let bad_idp = IdentityProviderSettings::new(
            SecretString::new("s3cr3t"),
            "idp.example.com",
            "main",
        );
        let err =
            ApplicationStack::build(test_env(), ApplicationConfig::new("example.com", bad_idp))
                .unwrap_err();
        assert!(err.to_string().contains("base URL"));
    }
}
