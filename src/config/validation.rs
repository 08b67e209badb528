//! Configuration validation.
//!
//! Serde handles syntax; this checks values. All errors are collected rather
//! than stopping at the first one.

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address `{value}`")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: invalid base URL `{value}`")]
    InvalidUrl { field: &'static str, value: String },

    /// The proxy speaks plain HTTP inside the deployment network.
    #[error("backend.internal_base: `{0}` must use http")]
    InternalNotHttp(String),

    #[error("{field}: must be greater than zero")]
    Zero { field: &'static str },

    #[error("routes.api_prefix: `{0}` must look like `/segment`")]
    InvalidPrefix(String),

    #[error("session.cookie_name: must be a non-empty token")]
    InvalidCookieName,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    check_base_url(&mut errors, "backend.internal_base", &config.backend.internal_base);
    check_base_url(&mut errors, "backend.public_base", &config.backend.public_base);
    if config.backend.internal_base.starts_with("https://") {
        errors.push(ValidationError::InternalNotHttp(config.backend.internal_base.clone()));
    }

    if config.timeouts.request_ms == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_ms" });
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero { field: "limits.max_body_bytes" });
    }

    let prefix = &config.routes.api_prefix;
    if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
        errors.push(ValidationError::InvalidPrefix(prefix.clone()));
    }

    let cookie = &config.session.cookie_name;
    if cookie.is_empty()
        || !cookie
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        errors.push(ValidationError::InvalidCookieName);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_base_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let valid = Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}
