mod api;
mod config;
mod engine;
mod error;
mod format;
mod gateway;
mod mcp;
mod service;
mod types;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::api::routes::{router, ApiState};
use crate::config::{Config, Transport};
use crate::error::Result;
use crate::gateway::HttpGateway;
use crate::service::QueryService;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    // stdout carries MCP frames; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let health = Arc::new(HealthState::new());
    let latency = Arc::new(LatencyStats::new());

    let gateway = HttpGateway::new(&cfg, Arc::clone(&health), Arc::clone(&latency))?;
    let service = Arc::new(QueryService::new(gateway));
    info!("Snapshot source: {}", cfg.rewards_api_url);

    match cfg.transport {
        Transport::Stdio => mcp::run_stdio(service).await,
        Transport::Http => {
            let app = router(ApiState {
                service,
                health,
                latency,
            });
            let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
            let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
            info!("HTTP API listening on {bind_addr}");

            axum::serve(listener, app).await?;
            Ok(())
        }
    }
}
