//! Palisade - deployment manifest synthesizer for OIDC-authenticated services

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use palisade::config::{DeployEnvironment, IdentityProviderSettings};
use palisade::resource::{ImageSource, SecretString};
use palisade::stack::{
    ApplicationConfig, ApplicationStack, IdentityBrokerConfig, IdentityBrokerStack,
    SharedInfraStack,
};
use palisade::synth::App;

/// Palisade - synthesize deployment manifests for an OIDC-authenticated
/// application and its identity broker
#[derive(Parser, Debug)]
#[command(name = "palisade", version, about, long_about = None)]
struct Cli {
    /// Print the stack manifest schema and exit
    #[arg(long)]
    schema: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synthesize the three stack manifests
    ///
    /// Builds the shared infrastructure stack, the identity broker stack,
    /// and the application stack in dependency order and writes one JSON
    /// manifest per stack. The zones for the configured domains must
    /// already exist; Palisade only consumes them.
    Synth(SynthArgs),
}

/// Synth mode arguments
///
/// Every argument can come from the environment; missing required values
/// fail before any stack is built.
#[derive(Parser, Debug)]
struct SynthArgs {
    /// Deployment account identifier
    #[arg(long, env = "PALISADE_ACCOUNT")]
    account: String,

    /// Deployment region
    #[arg(long, env = "PALISADE_REGION")]
    region: String,

    /// Public domain the application is served under (as app.<domain>)
    #[arg(long, env = "PALISADE_APP_DOMAIN")]
    app_domain: String,

    /// OIDC client identifier registered with the identity provider
    #[arg(long, env = "PALISADE_IDP_CLIENT_ID", default_value = palisade::DEFAULT_CLIENT_ID)]
    client_id: String,

    /// OIDC client secret
    #[arg(long, env = "PALISADE_IDP_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Identity provider base URL, e.g. https://keycloak.example.com
    #[arg(long, env = "PALISADE_IDP_URL")]
    idp_url: String,

    /// Identity provider realm the client is registered in
    #[arg(long, env = "PALISADE_IDP_REALM")]
    realm: String,

    /// OIDC scope requested at the edge
    #[arg(long, env = "PALISADE_IDP_SCOPE", default_value = palisade::DEFAULT_SCOPE)]
    scope: String,

    /// Domain for the identity broker when it differs from the app domain
    #[arg(long, env = "PALISADE_KEYCLOAK_DOMAIN")]
    keycloak_domain: Option<String>,

    /// Pull the broker image from a registry instead of building the local
    /// `keycloak` context
    #[arg(long, env = "PALISADE_KEYCLOAK_IMAGE")]
    keycloak_image: Option<String>,

    /// Generate the broker admin credentials as managed secrets
    #[arg(long)]
    generate_admin_credentials: bool,

    /// Directory the stack manifests are written to
    #[arg(short = 'o', long, default_value = "out")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.schema {
        let schema = serde_yaml::to_string(&App::manifest_schema())
            .map_err(|e| anyhow::anyhow!("Failed to serialize manifest schema: {}", e))?;
        println!("{schema}");
        return Ok(());
    }

    match cli.command {
        Some(Commands::Synth(args)) => run_synth(args),
        None => {
            use clap::CommandFactory;
            Cli::command().print_long_help()?;
            Ok(())
        }
    }
}

/// Build the three stacks in dependency order and write their manifests
fn run_synth(args: SynthArgs) -> anyhow::Result<()> {
    let environment = DeployEnvironment::new(args.account, args.region);

    let shared = SharedInfraStack::build(environment.clone())?;

    let broker_domain = args
        .keycloak_domain
        .unwrap_or_else(|| args.app_domain.clone());
    let mut broker_config = IdentityBrokerConfig::new(broker_domain)
        .with_handles(shared.handles())
        .with_admin_credentials(args.generate_admin_credentials);
    if let Some(reference) = args.keycloak_image {
        broker_config = broker_config.with_image(ImageSource::registry(reference));
    }
    let keycloak = IdentityBrokerStack::build(environment.clone(), broker_config)?;

    let identity_provider = IdentityProviderSettings::new(
        SecretString::new(args.client_secret),
        args.idp_url,
        args.realm,
    )
    .with_client_id(args.client_id)
    .with_scope(args.scope);
    let application = ApplicationStack::build(
        environment,
        ApplicationConfig::new(args.app_domain, identity_provider).with_handles(shared.handles()),
    )?;

    let mut app = App::new(args.out_dir);
    app.add_stack(shared.into_stack());
    app.add_stack(keycloak.into_stack());
    app.add_stack(application.into_stack());

    for path in app.synth()? {
        println!("{}", path.display());
    }
    Ok(())
}
