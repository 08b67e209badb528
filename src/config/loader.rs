//! Configuration loading from disk and environment.

use std::env;
use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { key: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { key, value } => write!(f, "Invalid {}: `{}`", key, value),
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

pub const ENV_INTERNAL_BASE: &str = "FOCAL_INTERNAL_BASE";
pub const ENV_PUBLIC_BASE: &str = "FOCAL_PUBLIC_BASE";
pub const ENV_TIMEOUT_MS: &str = "FOCAL_TIMEOUT_MS";
pub const ENV_BIND_ADDRESS: &str = "FOCAL_BIND_ADDRESS";

/// Build the effective configuration: file (or defaults), then environment,
/// then validation.
pub fn load_effective(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    load_with_env(path, |key| env::var(key).ok())
}

/// [`load_effective`] with the environment supplied by `lookup`.
pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => {
            tracing::info!("No config file given, using defaults");
            GatewayConfig::default()
        }
    };

    let config = apply_env_overrides(config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment-provided values onto a config.
///
/// `lookup` is injected so tests don't have to touch the process environment.
pub fn apply_env_overrides<F>(mut config: GatewayConfig, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_INTERNAL_BASE) {
        tracing::debug!(key = ENV_INTERNAL_BASE, value = %value, "Environment override");
        config.backend.internal_base = value;
    }
    if let Some(value) = lookup(ENV_PUBLIC_BASE) {
        tracing::debug!(key = ENV_PUBLIC_BASE, value = %value, "Environment override");
        config.backend.public_base = value;
    }
    if let Some(value) = lookup(ENV_BIND_ADDRESS) {
        tracing::debug!(key = ENV_BIND_ADDRESS, value = %value, "Environment override");
        config.listener.bind_address = value;
    }
    if let Some(value) = lookup(ENV_TIMEOUT_MS) {
        config.timeouts.request_ms = value.trim().parse().map_err(|_| ConfigError::Env {
            key: ENV_TIMEOUT_MS,
            value: value.clone(),
        })?;
        tracing::debug!(key = ENV_TIMEOUT_MS, value = %value, "Environment override");
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [backend]
            internal_base = "http://127.0.0.1:5000"

            [timeouts]
            request_ms = 1200
            "#
        )
        .unwrap();

        let config = load_with_env(Some(file.path()), |_| None).unwrap();
        assert_eq!(config.backend.internal_base, "http://127.0.0.1:5000");
        assert_eq!(config.timeouts.request_ms, 1200);
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timeouts]\nrequest_ms = 0").unwrap();

        match load_with_env(Some(file.path()), |_| None) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_INTERNAL_BASE, "http://backend.internal:8000"),
            (ENV_TIMEOUT_MS, "750"),
        ]);
        let config = apply_env_overrides(GatewayConfig::default(), |key| {
            env.get(key).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.backend.internal_base, "http://backend.internal:8000");
        assert_eq!(config.timeouts.request_ms, 750);
        assert_eq!(config.backend.public_base, "https://api.focal.pics");
    }

    #[test]
    fn test_env_overrides_are_validated() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timeouts]\nrequest_ms = 1200").unwrap();

        let result = load_with_env(Some(file.path()), |key| {
            (key == ENV_INTERNAL_BASE).then(|| "https://backend.internal".to_string())
        });
        match result {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_env_timeout_must_be_numeric() {
        let result = apply_env_overrides(GatewayConfig::default(), |key| {
            (key == ENV_TIMEOUT_MS).then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(ConfigError::Env { key: ENV_TIMEOUT_MS, .. })));
    }
}
