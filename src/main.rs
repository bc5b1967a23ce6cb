//! Role-aware HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                    ROLE BALANCER                      │
//!                      │                                                       │
//!     Client Request   │  ┌─────────┐    ┌──────────┐    ┌──────────────┐      │
//!     ─────────────────┼─▶│  http   │───▶│   auth   │───▶│   routing    │      │
//!                      │  │ server  │    │  (role)  │    │  dispatcher  │      │
//!                      │  └─────────┘    └──────────┘    └──────┬───────┘      │
//!                      │                                        │              │
//!                      │                                        ▼              │
//!                      │                                ┌──────────────┐       │
//!                      │              ┌────────────────▶│load_balancer │       │
//!                      │              │ mark alive/down │   pool       │       │
//!                      │       ┌──────┴──────┐          └──────┬───────┘       │
//!                      │       │   health    │                 │               │
//!                      │       │   monitor   │                 ▼               │
//!     Client Response  │       └─────────────┘          ┌──────────────┐       │
//!     ◀────────────────┼──────────────────────────────── │  forwarder   │◀──────┼── Backend
//!                      │                                └──────────────┘       │
//!                      └──────────────────────────────────────────────────────┘
//! ```

use tokio::net::TcpListener;
use clap::Parser;

use role_balancer::config::cli::Args;
use role_balancer::config::loader::{finalize, load_config};
use role_balancer::lifecycle::signals::shutdown_on_signal;
use role_balancer::observability::{logging, metrics};
use role_balancer::{BalancerConfig, HttpServer, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => BalancerConfig::default(),
    };
    args.apply(&mut config);
    let config = finalize(config)?;

    logging::init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "role-balancer starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        privileged_index = config.privileged_index(),
        health_interval_secs = config.health_check.interval_secs,
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

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
