//! Admin dashboard gateway.
//!
//! Serves the upstream forwarder under the configured mount path and relays
//! every call to the backend API.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser request          ┌──────────────────────────────────────────────┐
//!     ─────────────────────────┼─▶ listener ─▶ http server ─▶ forward          │
//!                              │                               │              │
//!                              │                               ▼              │
//!     Browser response         │                         upstream target      │
//!     ◀────────────────────────┼── response relay ◀──── reqwest client ◀──────┼──── Backend API
//!                              │                                              │
//!                              │  config · observability · lifecycle          │
//!                              └──────────────────────────────────────────────┘
//! ```
//!
//! Configuration comes from the TOML file named by the first argument or
//! `GATEWAY_CONFIG`, then `API_URL`, `APP_ENV` and `GATEWAY_BIND`.

use std::path::PathBuf;

use admin_gateway::config;
use admin_gateway::lifecycle::Shutdown;
use admin_gateway::observability::{logging, metrics};
use admin_gateway::HttpServer;
use tokio::net::TcpListener;

const ENV_CONFIG: &str = "GATEWAY_CONFIG";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(ENV_CONFIG).map(PathBuf::from));

    let config = config::load(config_path.as_deref())?;
    logging::init(&config.observability);

    tracing::info!("admin-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        mount_path = %config.listener.mount_path,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_os_signal();

    server.run(listener, shutdown.signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
