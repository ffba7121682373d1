//! Full-synthesis integration tests
//!
//! Build all three stacks the way the binary does - shared infrastructure
//! first, its handles passed into the broker and application stacks - then
//! synthesize into a temporary directory and assert on the JSON documents a
//! deployment engine would consume.

use palisade::config::{DeployEnvironment, IdentityProviderSettings};
use palisade::resource::{ImageSource, SecretString};
use palisade::stack::{
    ApplicationConfig, ApplicationStack, IdentityBrokerConfig, IdentityBrokerStack,
    SharedInfraStack,
};
use palisade::synth::App;

fn environment() -> DeployEnvironment {
    DeployEnvironment::new("123456789012", "eu-west-1")
}

/// Synthesize the full composition for `example.com` and return the parsed
/// manifests as (service, keycloak, application).
fn synthesize_all() -> (serde_json::Value, serde_json::Value, serde_json::Value) {
    let dir = tempfile::tempdir().unwrap();

    let shared = SharedInfraStack::build(environment()).unwrap();
    let keycloak = IdentityBrokerStack::build(
        environment(),
        IdentityBrokerConfig::new("example.com")
            .with_handles(shared.handles())
            .with_image(ImageSource::registry("quay.io/keycloak/keycloak:24.0")),
    )
    .unwrap();
    let application = ApplicationStack::build(
        environment(),
        ApplicationConfig::new(
            "example.com",
            IdentityProviderSettings::new(
                SecretString::new("s3cr3t"),
                "https://idp.example.com",
                "main",
            ),
        )
        .with_handles(shared.handles()),
    )
    .unwrap();

    let mut app = App::new(dir.path());
    app.add_stack(shared.into_stack());
    app.add_stack(keycloak.into_stack());
    app.add_stack(application.into_stack());
    let written = app.synth().unwrap();
    assert_eq!(written.len(), 3);

    let mut parsed = written.iter().map(|path| {
        let body = std::fs::read_to_string(path).unwrap();
        serde_json::from_str::<serde_json::Value>(&body).unwrap()
    });
    (
        parsed.next().unwrap(),
        parsed.next().unwrap(),
        parsed.next().unwrap(),
    )
}

#[test]
fn synthesizes_three_manifests_in_dependency_order() {
    let (service, keycloak, application) = synthesize_all();

    assert_eq!(service["name"], "service");
    assert_eq!(keycloak["name"], "keycloak");
    assert_eq!(application["name"], "application");

    for manifest in [&service, &keycloak, &application] {
        assert_eq!(manifest["environment"]["account"], "123456789012");
        assert_eq!(manifest["environment"]["region"], "eu-west-1");
    }
}

#[test]
fn shared_stack_owns_the_infrastructure_exactly_once() {
    let (service, keycloak, application) = synthesize_all();

    let kinds = |manifest: &serde_json::Value, kind: &str| {
        manifest["resources"]
            .as_object()
            .unwrap()
            .values()
            .filter(|r| r["kind"] == kind)
            .count()
    };

    for kind in ["Network", "ContainerCluster", "LoadBalancer", "LogGroup"] {
        assert_eq!(kinds(&service, kind), 1, "service stack must own one {kind}");
        assert_eq!(kinds(&keycloak, kind), 0, "keycloak stack must not redefine {kind}");
        assert_eq!(kinds(&application, kind), 0, "application stack must not redefine {kind}");
    }
}

#[test]
fn dependent_stacks_reference_shared_handles_by_name() {
    let (_, keycloak, application) = synthesize_all();

    assert_eq!(
        keycloak["resources"]["keycloak-service"]["cluster"],
        "service-cluster"
    );
    assert_eq!(
        keycloak["resources"]["keycloak-listener"]["loadBalancer"],
        "service-load-balancer"
    );
    assert_eq!(
        keycloak["resources"]["keycloak-database"]["network"],
        "service-network"
    );
    assert_eq!(
        application["resources"]["application-service"]["task"]["logging"]["logGroup"],
        "service-log-group"
    );
}

#[test]
fn certificate_domains_follow_the_subdomain_convention() {
    let (_, keycloak, application) = synthesize_all();

    assert_eq!(
        keycloak["resources"]["keycloak-certificate"]["domainName"],
        "keycloak.example.com"
    );
    assert_eq!(
        application["resources"]["application-certificate"]["domainName"],
        "app.example.com"
    );
    // Both validate against the pre-existing apex zone
    assert_eq!(
        keycloak["resources"]["keycloak-certificate"]["zone"]["domain"],
        "example.com"
    );
    assert_eq!(
        application["resources"]["application-certificate"]["zone"]["domain"],
        "example.com"
    );
}

#[test]
fn broker_database_wiring_keeps_credentials_deferred() {
    let (_, keycloak, _) = synthesize_all();

    let env = keycloak["resources"]["keycloak-service"]["task"]["env"]
        .as_array()
        .unwrap();
    let var = |name: &str| {
        env.iter()
            .find(|v| v["name"] == name)
            .unwrap_or_else(|| panic!("missing env var {name}"))
    };

    assert_eq!(var("DB_VENDOR")["value"], "mysql");
    assert_eq!(
        var("DB_PASSWORD")["valueFrom"]["secretRef"]["secret"],
        "keycloak-database-secret"
    );
    assert!(
        var("DB_PASSWORD").get("value").is_none(),
        "the database password must never be inlined"
    );
    assert_eq!(
        var("DB_ADDR")["valueFrom"]["attributeRef"]["resource"],
        "keycloak-database"
    );
    assert_eq!(
        var("DB_ADDR")["valueFrom"]["attributeRef"]["attribute"],
        "endpointHostname"
    );

    assert_eq!(
        keycloak["resources"]["keycloak-database-secret"]["excludePunctuation"],
        true
    );
}

#[test]
fn application_listener_authenticates_with_derived_endpoints() {
    let (_, _, application) = synthesize_all();

    let action = &application["resources"]["application-listener"]["defaultAction"];
    assert_eq!(action["type"], "authenticateOidc");
    assert_eq!(action["onUnauthenticated"], "authenticate");
    assert_eq!(action["clientId"], "my_app");
    assert_eq!(action["scope"], "openid");
    assert_eq!(
        action["endpoints"]["authorizationEndpoint"],
        "https://idp.example.com/auth/realms/main/protocol/openid-connect/auth"
    );
    assert_eq!(
        action["endpoints"]["tokenEndpoint"],
        "https://idp.example.com/auth/realms/main/protocol/openid-connect/token"
    );
    assert_eq!(
        action["endpoints"]["userInfoEndpoint"],
        "https://idp.example.com/auth/realms/main/protocol/openid-connect/userinfo"
    );
    assert_eq!(
        action["endpoints"]["issuer"],
        "https://idp.example.com/auth/realms/main"
    );
    assert_eq!(action["next"]["type"], "forward");
    assert_eq!(action["next"]["targetGroup"], "application-target-group");
}

#[test]
fn health_check_policy_is_identical_across_both_feature_stacks() {
    let (_, keycloak, application) = synthesize_all();

    let broker_check = &keycloak["resources"]["keycloak-target-group"]["healthCheck"];
    let app_check = &application["resources"]["application-target-group"]["healthCheck"];

    assert_eq!(
        broker_check["path"],
        "/auth/realms/master/.well-known/openid-configuration"
    );
    assert_eq!(app_check["path"], "/");

    for field in [
        "timeoutSeconds",
        "healthyThreshold",
        "unhealthyThreshold",
        "intervalSeconds",
    ] {
        assert_eq!(broker_check[field], app_check[field], "{field} must match");
    }
    assert_eq!(broker_check["timeoutSeconds"], 20);
    assert_eq!(broker_check["healthyThreshold"], 2);
    assert_eq!(broker_check["unhealthyThreshold"], 10);
    assert_eq!(broker_check["intervalSeconds"], 30);

    assert_eq!(
        keycloak["resources"]["keycloak-target-group"]["stickiness"]["cookieDurationSeconds"],
        86_400
    );
    assert_eq!(
        application["resources"]["application-target-group"]["stickiness"]
            ["cookieDurationSeconds"],
        86_400
    );
}

#[test]
fn broker_stack_outputs_the_load_balancer_dns_name() {
    let (_, keycloak, _) = synthesize_all();

    let output = &keycloak["outputs"]["loadBalancerDnsName"];
    assert_eq!(
        output["valueFrom"]["attributeRef"]["resource"],
        "service-load-balancer"
    );
    assert_eq!(output["valueFrom"]["attributeRef"]["attribute"], "dnsName");
}

#[test]
fn network_rules_wire_least_privilege_paths() {
    let (_, keycloak, application) = synthesize_all();

    let ingress = &keycloak["resources"]["keycloak-database-ingress"];
    assert_eq!(ingress["direction"], "ingress");
    assert_eq!(ingress["peer"]["service"], "keycloak-service");
    assert_eq!(ingress["ports"]["fromPort"], 3306);

    let egress = &application["resources"]["load-balancer-oidc-egress"];
    assert_eq!(egress["direction"], "egress");
    assert_eq!(egress["peer"]["kind"], "anyIpv4");
    assert_eq!(egress["ports"]["fromPort"], 443);
    assert_eq!(egress["endpoint"]["loadBalancer"], "service-load-balancer");
}

#[test]
fn standalone_stacks_create_their_own_infrastructure() {
    // Each feature stack deployed without shared handles creates exactly
    // one of each default resource.
    let keycloak = IdentityBrokerStack::build(
        environment(),
        IdentityBrokerConfig::new("example.com"),
    )
    .unwrap();

    for kind in ["Network", "ContainerCluster", "LoadBalancer", "LogGroup"] {
        assert_eq!(keycloak.stack().count_kind(kind), 1, "expected one {kind}");
    }

    // The created defaults are what the dependent resources point at
    let json = serde_json::to_value(keycloak.stack()).unwrap();
    assert_eq!(
        json["resources"]["keycloak-listener"]["loadBalancer"],
        "keycloak-load-balancer"
    );
    assert_eq!(
        json["outputs"]["loadBalancerDnsName"]["valueFrom"]["attributeRef"]["resource"],
        "keycloak-load-balancer"
    );
}
