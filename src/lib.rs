//! Palisade - deployment manifest synthesizer for OIDC-authenticated services
//!
//! Palisade declares the infrastructure for running a web application behind an
//! OpenID-Connect-authenticating load balancer: an isolated network, a container
//! cluster, a managed relational database, a self-hosted identity broker
//! (Keycloak-class), and an edge listener that authenticates every request
//! before it reaches the application.
//!
//! # Architecture
//!
//! Everything here is declarative resource composition. A single synchronous
//! build constructs three composable stacks and serializes each one to a JSON
//! manifest document; the deployment engine consuming those manifests performs
//! all provisioning, health checking, certificate issuance, and OIDC token
//! validation. No resource is touched at runtime by this crate.
//!
//! - The `service` stack owns the network, cluster, load balancer, and log
//!   group, and exposes them as handles.
//! - The `keycloak` stack stands up the identity broker and its database.
//! - The `application` stack stands up the user-facing service and wires the
//!   authenticate-OIDC action onto its listener.
//!
//! Dependent stacks receive handles by value and never mutate a shared
//! handle's identity; they only attach sub-resources to it.
//!
//! # Modules
//!
//! - [`resource`] - Typed cloud resource descriptions (the manifest dialect)
//! - [`stack`] - The three stack builders and the shared service composer
//! - [`slot`] - The create-if-absent slot type for shareable handles
//! - [`oidc`] - OIDC endpoint derivation from `(base_url, realm)`
//! - [`config`] - Entry-point configuration structs
//! - [`synth`] - Manifest serialization and output
//! - [`error`] - Error types

#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod oidc;
pub mod resource;
pub mod slot;
pub mod stack;
pub mod synth;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Default Configuration Constants
// =============================================================================
// These constants define the default values used throughout Palisade.
// Centralizing them here keeps the two feature stacks in lockstep: the
// health-check and stickiness policies must be identical on both sides of
// the identity boundary.

/// Port both the identity broker and the application containers listen on
pub const CONTAINER_PORT: u16 = 8080;

/// Port the HTTPS edge listeners are served on
pub const HTTPS_PORT: u16 = 443;

/// Port of the managed relational database (MySQL-compatible engine)
pub const DATABASE_PORT: u16 = 3306;

/// Subdomain under which the identity broker is reachable
pub const BROKER_SUBDOMAIN: &str = "keycloak";

/// Subdomain under which the application is reachable
pub const APP_SUBDOMAIN: &str = "app";

/// Well-known OpenID Connect discovery path used as the broker health check
///
/// A successful response proves the broker is up, its database is reachable,
/// and the master realm is initialized.
pub const DISCOVERY_PATH: &str = "/auth/realms/master/.well-known/openid-configuration";

/// Health check timeout in seconds
///
/// Conservative: the identity broker is a slow-starting Java service, so the
/// policy is biased toward slow failure detection over false positives.
pub const HEALTH_CHECK_TIMEOUT_SECS: u32 = 20;

/// Consecutive successes before a target is marked healthy
pub const HEALTHY_THRESHOLD: u32 = 2;

/// Consecutive failures before a target is marked unhealthy
pub const UNHEALTHY_THRESHOLD: u32 = 10;

/// Seconds between health checks
pub const HEALTH_CHECK_INTERVAL_SECS: u32 = 30;

/// Session stickiness cookie duration (24 hours)
///
/// Identity broker sessions are sticky to a single backend instance.
pub const SESSION_COOKIE_DURATION_SECS: u64 = 24 * 60 * 60;

/// Default OIDC scope requested at the edge
pub const DEFAULT_SCOPE: &str = "openid";

/// Default OIDC client identifier
pub const DEFAULT_CLIENT_ID: &str = "my_app";

/// Default log retention in days for created log groups
pub const DEFAULT_LOG_RETENTION_DAYS: u32 = 7;

/// Default task CPU units
pub const DEFAULT_TASK_CPU: u32 = 256;

/// Default task memory in MiB
pub const DEFAULT_TASK_MEMORY_MIB: u32 = 512;

/// Default desired container count per service
pub const DEFAULT_DESIRED_COUNT: u32 = 1;
