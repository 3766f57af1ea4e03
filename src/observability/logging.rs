//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` wins over the configured level

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("admin_gateway={level},tower_http={level}"))
    })
}

/// Install the global subscriber for the gateway server.
pub fn init(config: &ObservabilityConfig) {
    let registry = tracing_subscriber::registry().with(filter_for(&config.log_level));
    match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

/// Install a stderr subscriber for command-line tools, keeping stdout for output.
pub fn init_cli(level: &str) {
    tracing_subscriber::registry()
        .with(filter_for(level))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
