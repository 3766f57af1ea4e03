//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::upstream::DeploymentTier;

/// Root configuration for the admin gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, forwarder mount point).
    pub listener: ListenerConfig,

    /// Upstream API selection.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Inbound size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Client session settings (login surface, durable token storage).
    pub session: SessionConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Path prefix the forwarder is mounted under.
    pub mount_path: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            mount_path: "/api/proxy".to_string(),
        }
    }
}

/// Upstream API configuration.
///
/// `api_url` wins when set; otherwise the tier's fallback URL is used.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Explicit upstream base URL (e.g., "https://api.example.com/api/v1").
    pub api_url: Option<String>,

    /// Deployment tier used to pick the fallback URL.
    pub tier: DeploymentTier,
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Inbound request deadline in seconds.
    pub request_secs: u64,

    /// Upstream connection establishment timeout. Unset leaves the transport default.
    pub upstream_connect_secs: Option<u64>,

    /// Total upstream request timeout. Unset leaves the transport default.
    pub upstream_secs: Option<u64>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 60,
            upstream_connect_secs: None,
            upstream_secs: None,
        }
    }
}

/// Inbound body limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum body size in bytes accepted from the browser.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 25 * 1024 * 1024, // 25MB, decor images go through here
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Client session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Path of the login surface, used as the redirect target on 401.
    pub login_path: String,

    /// File backing the durable token store.
    pub token_store: String,

    /// Optional locale sent as `Accept-Language`.
    pub locale: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            token_store: ".admin-gateway/session.json".to_string(),
            locale: None,
        }
    }
}
