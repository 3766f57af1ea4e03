//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::upstream::DeploymentTier;

/// Upstream base URL override.
pub const ENV_API_URL: &str = "API_URL";
/// Deployment tier override ("production" or "development").
pub const ENV_APP_ENV: &str = "APP_ENV";
/// Listener bind address override.
pub const ENV_BIND: &str = "GATEWAY_BIND";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file, then apply environment overrides.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: GatewayConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;
    finalize(config)
}

/// Build configuration from defaults, an optional file, and the environment.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => finalize(GatewayConfig::default()),
    }
}

fn finalize(mut config: GatewayConfig) -> Result<GatewayConfig, ConfigError> {
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment overrides using the given lookup.
///
/// Empty values are ignored; an unrecognised `APP_ENV` leaves the tier untouched.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(api_url) = non_empty(ENV_API_URL) {
        config.upstream.api_url = Some(api_url);
    }

    if let Some(tier) = non_empty(ENV_APP_ENV) {
        match tier.parse::<DeploymentTier>() {
            Ok(tier) => config.upstream.tier = tier,
            Err(_) => tracing::warn!(value = %tier, "Ignoring unrecognised {}", ENV_APP_ENV),
        }
    }

    if let Some(bind) = non_empty(ENV_BIND) {
        config.listener.bind_address = bind;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(
            &mut config,
            lookup(&[
                ("API_URL", "http://localhost:8000/api/v1"),
                ("APP_ENV", "production"),
                ("GATEWAY_BIND", "127.0.0.1:4000"),
            ]),
        );

        assert_eq!(config.upstream.api_url.as_deref(), Some("http://localhost:8000/api/v1"));
        assert_eq!(config.upstream.tier, DeploymentTier::Production);
        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
    }

    #[test]
    fn test_empty_env_values_ignored() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(&mut config, lookup(&[("API_URL", ""), ("APP_ENV", "staging")]));

        assert_eq!(config.upstream.api_url, None);
        assert_eq!(config.upstream.tier, DeploymentTier::Development);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[listener]
mount_path = "/backend"

[upstream]
tier = "production"

[session]
login_path = "/fr/login"
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.mount_path, "/backend");
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(config.session.login_path, "/fr/login");
    }

    #[test]
    fn test_invalid_file_reports_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timeouts]\nrequest_secs = 0").unwrap();

        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.field == "timeouts.request_secs"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
