//! Linode dashboard server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use linode_dashboard::aggregate::Aggregator;
use linode_dashboard::client::LinodeClientFactory;
use linode_dashboard::config::Config;
use linode_dashboard::discovery::{discover, EnvCredentials};
use linode_dashboard::render::Renderer;
use linode_dashboard::server::{run_server, AppState};

/// Consolidated billing dashboard for multiple Linode accounts.
#[derive(Parser)]
#[command(name = "linode-dashboard")]
#[command(version, about)]
struct Cli {
    /// Listen port (overrides `PORT`).
    #[arg(long)]
    port: Option<u16>,

    /// Bind address (overrides `BIND_ADDR`).
    #[arg(long)]
    bind: Option<String>,

    /// Static asset directory (overrides `STATIC_DIR`).
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = dotenvy::dotenv() {
        warn!("No .env file loaded: {e}");
    }

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(dir) = cli.static_dir {
        config.static_dir = dir;
    }

    let auth = config.authenticator()?;
    let renderer = Renderer::new().context("Failed to parse templates")?;
    let aggregator = Aggregator::new(Arc::new(LinodeClientFactory::new()))
        .with_concurrency(config.fetch_concurrency)
        .with_account_timeout(config.account_timeout);

    let accounts = discover(&EnvCredentials).len();
    info!(
        accounts,
        session_mode = ?config.session_mode,
        concurrency = config.fetch_concurrency,
        "Starting Linode dashboard"
    );
    if accounts == 0 {
        warn!("No LINODE_TOKEN_<N> variables found; the dashboard will be empty");
    }

    let state = AppState {
        auth: Arc::new(auth),
        aggregator,
        credentials: Arc::new(EnvCredentials),
        renderer: Arc::new(renderer),
    };

    run_server(state, &config.static_dir, &config.listen_addr()).await
}
