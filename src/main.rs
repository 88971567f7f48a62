//! API Gateway
//!
//! An HTTP/WebSocket reverse-proxy gateway built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                  GATEWAY                     │
//!                      │                                              │
//!   Client Request     │  ┌─────────┐     ┌──────────────┐           │
//!   ──────────────────▶│  │  http   │────▶│load_balancer │           │
//!                      │  │ server  │     │   + pool     │           │
//!                      │  └────┬────┘     └──────┬───────┘           │
//!                      │       │                 │                    │
//!                      │  plain│HTTP      target│selected             │
//!                      │       ▼                 ▼                    │
//!   Client Response    │  ┌─────────┐     ┌──────────────┐           │
//!   ◀──────────────────│  │response │◀────│   upstream   │◀──────────┼── Backend
//!                      │  │  relay  │     │   request    │           │
//!                      │  └─────────┘     └──────────────┘           │
//!                      │                                              │
//!   WebSocket Upgrade  │  ┌──────────────────────────────┐           │
//!   ◀─────────────────▶│  │ websocket bridge (2 relays)  │◀─────────▶│── Backend
//!                      │  └──────────────────────────────┘           │
//!                      │                                              │
//!                      │  ┌────────────────────────────────────────┐  │
//!                      │  │ config │ health │ observability │ life- │  │
//!                      │  │        │ checks │               │ cycle │  │
//!                      │  └────────────────────────────────────────┘  │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use api_gateway::config::loader;
use api_gateway::lifecycle::{signals, Shutdown};
use api_gateway::observability::{logging, metrics};
use api_gateway::{GatewayConfig, GatewayServer};

#[derive(Parser, Debug)]
#[command(name = "api-gateway", version, about = "HTTP/WebSocket reverse-proxy gateway")]
struct Args {
    /// Path to the TOML configuration file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => loader::load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        routes = config.routes.len(),
        "api-gateway starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let server = GatewayServer::new(config)?;

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    server.run(listener, shutdown).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
