//! Admin dashboard gateway library.
//!
//! Hosts the same-origin upstream forwarder and the typed API client (plus
//! resource services) that talk to the backend through it.

pub mod client;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod services;
pub mod upstream;

pub use client::ApiClient;
pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
