//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use admin_gateway::client::{ApiClient, Environment, MemoryTokenStore, Session, TokenStore};
use admin_gateway::upstream::UpstreamTarget;
use admin_gateway::{GatewayConfig, HttpServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;
use wiremock::MockServer;

/// Path prefix the mock upstream serves the API under.
pub const API_PREFIX: &str = "/api/v1";

/// A gateway running on an ephemeral port in front of a mock upstream.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub upstream: MockServer,
    shutdown: Shutdown,
}

impl TestGateway {
    /// Forwarder URL for a path below the mount point.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}/api/proxy{}", self.addr, path)
    }

    pub fn origin(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).unwrap()
    }

    pub fn config(&self) -> GatewayConfig {
        config_for(&self.upstream)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn upstream_url(upstream: &MockServer) -> String {
    format!("{}{}", upstream.uri(), API_PREFIX)
}

pub fn config_for(upstream: &MockServer) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.api_url = Some(upstream_url(upstream));
    config
}

/// Start a mock upstream and a gateway forwarding to it.
pub async fn spawn_gateway() -> TestGateway {
    spawn_gateway_with(|_| {}).await
}

/// Like [`spawn_gateway`], with the configuration adjusted before startup.
pub async fn spawn_gateway_with<F>(adjust: F) -> TestGateway
where
    F: FnOnce(&mut GatewayConfig),
{
    let upstream = MockServer::start().await;
    let mut config = config_for(&upstream);
    adjust(&mut config);

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let signal = shutdown.signal();
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    TestGateway {
        addr,
        upstream,
        shutdown,
    }
}

/// A client talking to the mock upstream directly, with an in-memory store.
pub fn server_client(upstream: &MockServer) -> (ApiClient, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::new());
    let environment = Environment::Server(admin_gateway::client::ServerEnvironment {
        upstream: UpstreamTarget::parse(&upstream_url(upstream)).unwrap(),
    });
    let session = Arc::new(Session::new(store.clone() as Arc<dyn TokenStore>));
    let client = ApiClient::with_client(reqwest::Client::new(), environment, session);
    (client, store)
}

/// A client going through the gateway's forwarder, as the dashboard does.
pub fn browser_client(gateway: &TestGateway) -> (ApiClient, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::new());
    let environment = Environment::browser(gateway.origin(), &gateway.config());
    let session = Arc::new(Session::new(store.clone() as Arc<dyn TokenStore>));
    let client = ApiClient::with_client(reqwest::Client::new(), environment, session);
    (client, store)
}

/// Start a backend that answers every connection with `response` verbatim.
///
/// For responses wiremock cannot produce, such as a body shorter than its
/// declared `Content-Length`.
pub async fn start_raw_backend(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// A server-environment client for an arbitrary base URL over the given store.
pub fn client_for(base_url: &str, store: Arc<MemoryTokenStore>) -> ApiClient {
    let environment = Environment::Server(admin_gateway::client::ServerEnvironment {
        upstream: UpstreamTarget::parse(base_url).unwrap(),
    });
    let session = Arc::new(Session::hydrate(store as Arc<dyn TokenStore>).unwrap());
    ApiClient::with_client(reqwest::Client::new(), environment, session)
}
