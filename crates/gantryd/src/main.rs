//! gantryd — the Gantry daemon.
//!
//! Single binary that assembles the autoscaler:
//! - Parameter store (redb)
//! - Orchestrator fleet client
//! - Demand counter + capacity reconciler
//! - Webhook API
//!
//! # Usage
//!
//! ```text
//! gantryd serve --cluster agents --service ci-agent \
//!     --orchestrator-url http://orchestrator:8443 --max-agents 5
//! gantryd set-param /gantry/notification-token <secret>
//! gantryd get-param /gantry/demand
//! ```
//!
//! Every `serve` flag has a `GANTRY_*` environment fallback.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use gantry_api::{ApiState, build_router};
use gantry_core::Settings;
use gantry_fleet::HttpFleet;
use gantry_scale::Reconciler;
use gantry_state::{DemandCounter, ParamStore, RedbParamStore};

#[derive(Parser)]
#[command(name = "gantryd", about = "Gantry webhook autoscaler daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the autoscaler daemon.
    Serve(ServeArgs),

    /// Write a parameter in the embedded store (e.g. the signing secret,
    /// or seeding the demand counter).
    SetParam {
        /// Data directory holding the parameter database.
        #[arg(long, env = "GANTRY_DATA_DIR", default_value = "/var/lib/gantry")]
        data_dir: PathBuf,

        /// Parameter name, e.g. `/gantry/notification-token`.
        name: String,

        /// Parameter value.
        value: String,
    },

    /// Read a parameter from the embedded store.
    GetParam {
        #[arg(long, env = "GANTRY_DATA_DIR", default_value = "/var/lib/gantry")]
        data_dir: PathBuf,

        /// Parameter name.
        name: String,
    },
}

#[derive(Args)]
struct ServeArgs {
    /// Port the webhook endpoint listens on.
    #[arg(long, env = "GANTRY_PORT", default_value = "8080")]
    port: u16,

    /// Data directory for persistent state.
    #[arg(long, env = "GANTRY_DATA_DIR", default_value = "/var/lib/gantry")]
    data_dir: PathBuf,

    /// Base URL of the container orchestrator API.
    #[arg(long, env = "GANTRY_ORCHESTRATOR_URL")]
    orchestrator_url: String,

    /// Cluster the managed agent service runs in.
    #[arg(long, env = "GANTRY_CLUSTER")]
    cluster: String,

    /// Service whose desired count gantry drives.
    #[arg(long, env = "GANTRY_SERVICE")]
    service: String,

    /// Region hint forwarded to the orchestrator.
    #[arg(long, env = "GANTRY_REGION")]
    region: Option<String>,

    /// Ceiling on the desired agent count.
    #[arg(long, env = "GANTRY_MAX_AGENTS", default_value = "5")]
    max_agents: u32,

    /// Parameter holding the notification-signing secret.
    #[arg(
        long,
        env = "GANTRY_TOKEN_PARAM",
        default_value = "/gantry/notification-token"
    )]
    token_param: String,

    /// Parameter holding the demand counter.
    #[arg(long, env = "GANTRY_COUNTER_PARAM", default_value = "/gantry/demand")]
    counter_param: String,

    /// Per-call orchestrator timeout in seconds.
    #[arg(long, env = "GANTRY_FLEET_TIMEOUT", default_value = "5")]
    fleet_timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gantryd=debug,gantry=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::SetParam {
            data_dir,
            name,
            value,
        } => {
            let store = open_store(&data_dir)?;
            store.put(&name, &value).await?;
            println!("{name} set");
            Ok(())
        }
        Command::GetParam { data_dir, name } => {
            let store = open_store(&data_dir)?;
            match store.get(&name).await? {
                Some(value) => {
                    println!("{value}");
                    Ok(())
                }
                None => anyhow::bail!("parameter {name} is not set"),
            }
        }
    }
}

fn open_store(data_dir: &PathBuf) -> anyhow::Result<RedbParamStore> {
    std::fs::create_dir_all(data_dir)?;
    Ok(RedbParamStore::open(&data_dir.join("gantry.redb"))?)
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    info!("gantry daemon starting");

    // ── Initialize subsystems ──────────────────────────────────

    let store = Arc::new(open_store(&args.data_dir)?);
    info!(path = ?args.data_dir.join("gantry.redb"), "parameter store opened");

    let fleet = Arc::new(HttpFleet::new(
        &args.orchestrator_url,
        args.region.clone(),
        Duration::from_secs(args.fleet_timeout),
    ));
    info!(url = %args.orchestrator_url, timeout_secs = args.fleet_timeout, "fleet client initialized");

    let settings = Settings {
        cluster: args.cluster,
        service: args.service,
        region: args.region,
        max_agents: args.max_agents,
        token_param: args.token_param,
        counter_param: args.counter_param,
    };
    info!(
        cluster = %settings.cluster,
        service = %settings.service,
        max_agents = settings.max_agents,
        "scaling settings loaded"
    );

    let counter = DemandCounter::new(store.clone(), settings.counter_param.clone());
    let reconciler = Arc::new(Reconciler::new(counter, fleet, settings.clone()));

    // ── Start webhook server ───────────────────────────────────

    let router = build_router(ApiState {
        secrets: store,
        reconciler,
        token_param: settings.token_param.clone(),
    });
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    info!(%addr, "webhook server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutdown signal received");
        })
        .await?;

    info!("gantry daemon stopped");
    Ok(())
}
