//! Upstream API target resolution.
//!
//! The upstream base URL is resolved once per process from configuration:
//! an explicit `api_url` wins, otherwise the deployment tier's fallback is used.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;

/// Fallback upstream for production deployments.
pub const PRODUCTION_API_URL: &str = "https://api.simint-bot.com/api/v1";
/// Fallback upstream for every other deployment.
pub const DEVELOPMENT_API_URL: &str = "https://devapi.simint-bot.com/api/v1";

/// Deployment tier, selecting the fallback upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentTier {
    Production,
    #[default]
    Development,
}

impl DeploymentTier {
    pub fn fallback_url(self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_API_URL,
            Self::Development => DEVELOPMENT_API_URL,
        }
    }
}

impl FromStr for DeploymentTier {
    type Err = UpstreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            other => Err(UpstreamError::UnknownTier(other.to_string())),
        }
    }
}

/// Errors raised while resolving an upstream target.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid upstream URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("upstream URL '{0}' cannot carry path segments")]
    NotABase(String),

    #[error("unknown deployment tier '{0}'")]
    UnknownTier(String),
}

/// A fully resolved upstream base URL.
///
/// Only constructed through [`UpstreamTarget::resolve`] or [`UpstreamTarget::parse`],
/// so a value of this type is always an absolute, path-capable URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    base: Url,
}

impl UpstreamTarget {
    /// Resolve the target from configuration.
    pub fn resolve(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let raw = config
            .api_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| config.tier.fallback_url());
        Self::parse(raw)
    }

    /// Parse an absolute base URL.
    pub fn parse(raw: &str) -> Result<Self, UpstreamError> {
        let base = Url::parse(raw.trim()).map_err(|source| UpstreamError::InvalidUrl {
            url: raw.to_string(),
            source,
        })?;
        if base.cannot_be_a_base() {
            return Err(UpstreamError::NotABase(raw.to_string()));
        }
        Ok(Self { base })
    }

    /// The base URL as configured.
    pub fn as_url(&self) -> &Url {
        &self.base
    }

    /// The base URL without a trailing slash, ready for endpoint concatenation.
    pub fn as_str(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Build `<base>/<segments...>?<query>`.
    ///
    /// Each segment is percent-encoded on its own; the query is re-attached verbatim.
    pub fn join<I, S>(&self, segments: I, query: Option<&str>) -> Url
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                let segment = segment.as_ref();
                if !segment.is_empty() {
                    path.push(segment);
                }
            }
        }
        url.set_query(query.filter(|q| !q.is_empty()));
        url
    }
}

impl std::fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
