//! Focal web gateway.
//!
//! ```text
//!     Browser ──▶ listener ──▶ http::server ─┬─▶ proxy   ──▶ internal backend (REST)
//!                                            ├─▶ session ──▶ internal backend (/session)
//!                                            └─▶ pages   ──▶ internal backend (/graphql)
//!
//!     config file ──▶ watcher ──▶ server (hot swap)
//!     SIGINT/SIGTERM ──▶ Shutdown ──▶ graceful drain
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use focal_gateway::config::loader::load_effective;
use focal_gateway::config::watcher::ConfigWatcher;
use focal_gateway::lifecycle::{signals, Shutdown};
use focal_gateway::observability::{logging, metrics};
use focal_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "focal-gateway", version, about = "Web gateway for the Focal photo site")]
struct Args {
    /// TOML configuration file. Defaults and FOCAL_* variables apply without one.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_effective(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("focal-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        internal_base = %config.backend.internal_base,
        api_prefix = %config.routes.api_prefix,
        request_timeout_ms = config.timeouts.request_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher stops when dropped, so it lives as long as main.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.clone());
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::forward_to(shutdown.clone());

    let server = HttpServer::new(config);
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
