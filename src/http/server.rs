//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the forwarder mounted under the configured prefix
//! - Wire up middleware (tracing, limits, timeout, request ID)
//! - Build the shared upstream HTTP client
//! - Bind server to listener and drain on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::get,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::forward::forward;
use crate::http::request::{MakeRequestUuidV4, X_REQUEST_ID};
use crate::lifecycle::ShutdownSignal;
use crate::upstream::{UpstreamError, UpstreamTarget};

/// Errors raised while assembling the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamTarget>,
    pub client: reqwest::Client,
    pub max_body_size: usize,
}

/// HTTP server hosting the upstream forwarder.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    upstream: Arc<UpstreamTarget>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// The upstream target is resolved here, once, for the life of the server.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let upstream = Arc::new(UpstreamTarget::resolve(&config.upstream)?);

        let mut client = reqwest::Client::builder();
        if let Some(secs) = config.timeouts.upstream_connect_secs {
            client = client.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.timeouts.upstream_secs {
            client = client.timeout(Duration::from_secs(secs));
        }

        let state = AppState {
            upstream: upstream.clone(),
            client: client.build()?,
            max_body_size: config.limits.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            upstream,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mount = config.listener.mount_path.trim_end_matches('/');
        let limit = config.limits.max_body_size;

        Router::new()
            .route(
                &format!("{mount}/{{*path}}"),
                get(forward)
                    .post(forward)
                    .put(forward)
                    .patch(forward)
                    .delete(forward),
            )
            .with_state(state)
            .layer(DefaultBodyLimit::max(limit))
            .layer(RequestBodyLimitLayer::new(limit))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
            .layer(TraceLayer::new_for_http())
    }

    /// The assembled router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown signal fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mount_path = %self.config.listener.mount_path,
            upstream = %self.upstream,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The resolved upstream target.
    pub fn upstream(&self) -> &UpstreamTarget {
        &self.upstream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn unreachable_config() -> GatewayConfig {
        // Port 9 (discard) on loopback is never served in test environments.
        let mut config = GatewayConfig::default();
        config.upstream.api_url = Some("http://127.0.0.1:9/api/v1".into());
        config
    }

    #[tokio::test]
    async fn test_unsupported_method_rejected() {
        let server = HttpServer::new(unreachable_config()).unwrap();
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/proxy/sectors")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_outside_mount_is_not_found() {
        let server = HttpServer::new(unreachable_config()).unwrap();
        let response = server
            .router()
            .oneshot(Request::builder().uri("/sectors").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_transport_failure_is_502_with_request_id() {
        let server = HttpServer::new(unreachable_config()).unwrap();
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/proxy/sectors?skip=0")
                    .header("x-request-id", "req-502")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(response.headers().get("x-request-id").unwrap(), "req-502");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Proxy Error");
        assert!(body["details"].as_str().unwrap().contains("upstream request failed"));
    }

    #[tokio::test]
    async fn test_oversized_chunked_body_is_413() {
        let mut config = unreachable_config();
        config.limits.max_body_size = 64;
        let server = HttpServer::new(config).unwrap();

        // No content-length: the limit is only hit while buffering.
        let body = format!(r#"{{"name":"{}","is_active":true}}"#, "x".repeat(200));
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/proxy/sectors/1")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_invalid_upstream_fails_fast() {
        let mut config = GatewayConfig::default();
        config.upstream.api_url = Some("not a url".into());
        assert!(matches!(HttpServer::new(config), Err(ServerError::Upstream(_))));
    }
}
