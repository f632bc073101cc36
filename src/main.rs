//! Marketplace API Gateway
//!
//! A stateless gateway built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────┐
//!                    │                   GATEWAY                       │
//!                    │                                                 │
//!   Client Request   │  ┌──────┐    ┌─────────┐    ┌──────────────┐   │
//!   ─────────────────┼─▶│ cors │───▶│  http   │───▶│   routing    │   │
//!                    │  │layer │    │ server  │    │ route table  │   │
//!                    │  └──────┘    └─────────┘    └──────┬───────┘   │
//!                    │                                    │           │
//!                    │                   ┌────────────────┴───┐       │
//!                    │                   ▼                    ▼       │
//!                    │            ┌───────────┐       ┌───────────┐   │
//!                    │            │ upstream  │       │  funnel   │   │
//!                    │            │  client   │◀──x2──│aggregator │   │
//!                    │            └─────┬─────┘       └───────────┘   │
//!                    │                  │                             │
//!   Client Response  │  ┌──────────┐    ▼                             │
//!   ◀────────────────┼──│ response │◀── upstream status + body ◀──────┼── Marketplace
//!                    │  │ envelope │                                   │     API
//!                    │  └──────────┘                                   │
//!                    └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use wb_gateway::config::{self, GatewayConfig};
use wb_gateway::http::HttpServer;
use wb_gateway::observability::{logging, metrics};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "wb-gateway", about = "Marketplace API gateway")]
struct Args {
    /// Path to a TOML configuration file. Environment variables
    /// (WB_BASE, WB_TOKEN, WB_BEARER, WB_AUTH_HEADER) override it.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration: defaults -> optional file -> environment.
    let config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => GatewayConfig::from_env()?,
    };

    logging::init_logging(&config.observability.log_level);

    tracing::info!("wb-gateway v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_base = %config.upstream.base_url,
        auth_header = %config.upstream.auth_header,
        bearer = config.upstream.bearer,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    // Metrics exporter
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Create and run HTTP server
    let server = HttpServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
