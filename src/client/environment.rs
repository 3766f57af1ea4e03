//! Runtime environment of an [`ApiClient`](crate::client::ApiClient).
//!
//! Resolved once at startup and injected, instead of probing the runtime on
//! every call. A browser-hosted client talks to the same-origin forwarder and
//! is navigated to the login surface on 401; a server-side client talks to the
//! upstream directly and never redirects.

use url::Url;

use crate::config::GatewayConfig;
use crate::upstream::{UpstreamError, UpstreamTarget};

/// Where the client runs, and therefore where it sends requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Browser(BrowserEnvironment),
    Server(ServerEnvironment),
}

/// Client hosted behind the gateway's forwarder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserEnvironment {
    /// Origin serving the dashboard and the forwarder (e.g. "http://localhost:3000").
    pub origin: Url,
    /// Forwarder mount path (e.g. "/api/proxy").
    pub proxy_path: String,
    /// Login surface to navigate to when the session expires.
    pub login_path: String,
}

/// Client talking to the upstream API directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEnvironment {
    pub upstream: UpstreamTarget,
}

impl Environment {
    /// Browser environment using the configured mount and login paths.
    pub fn browser(origin: Url, config: &GatewayConfig) -> Self {
        Self::Browser(BrowserEnvironment {
            origin,
            proxy_path: config.listener.mount_path.clone(),
            login_path: config.session.login_path.clone(),
        })
    }

    /// Server environment with the upstream resolved from configuration.
    pub fn server(config: &GatewayConfig) -> Result<Self, UpstreamError> {
        Ok(Self::Server(ServerEnvironment {
            upstream: UpstreamTarget::resolve(&config.upstream)?,
        }))
    }

    /// Base URL every relative endpoint is appended to, without a trailing slash.
    pub fn base_url(&self) -> String {
        match self {
            Self::Browser(env) => format!(
                "{}/{}",
                env.origin.as_str().trim_end_matches('/'),
                env.proxy_path.trim_matches('/')
            ),
            Self::Server(env) => env.upstream.as_str().to_string(),
        }
    }

    /// Login surface to navigate to on session expiry, browser only.
    pub fn login_redirect(&self) -> Option<&str> {
        match self {
            Self::Browser(env) => Some(env.login_path.as_str()),
            Self::Server(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_base_url_points_at_forwarder() {
        let origin = Url::parse("http://localhost:3000/").unwrap();
        let env = Environment::browser(origin, &GatewayConfig::default());

        assert_eq!(env.base_url(), "http://localhost:3000/api/proxy");
        assert_eq!(env.login_redirect(), Some("/login"));
    }

    #[test]
    fn test_server_base_url_points_at_upstream() {
        let mut config = GatewayConfig::default();
        config.upstream.api_url = Some("http://backend:8000/api/v1/".into());
        let env = Environment::server(&config).unwrap();

        assert_eq!(env.base_url(), "http://backend:8000/api/v1");
        assert_eq!(env.login_redirect(), None);
    }
}
