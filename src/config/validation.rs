//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Pool shape: non-empty, at most one privileged backend
//! - Backend URLs parse and use plain http
//! - Value ranges (interval and timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use axum::http::HeaderName;
use thiserror::Error;
use url::Url;

use crate::config::schema::BalancerConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("at least one backend is required")]
    NoBackends,

    #[error("only one backend may be privileged, found {0:?}")]
    MultiplePrivileged(Vec<usize>),

    #[error("backend {index} has invalid url '{url}'")]
    InvalidBackendUrl { index: usize, url: String },

    #[error("backend {index} uses unsupported scheme '{scheme}'")]
    UnsupportedScheme { index: usize, scheme: String },

    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("health_check.interval_secs must be greater than zero")]
    ZeroInterval,

    #[error("health_check.timeout_secs must be greater than zero")]
    ZeroProbeTimeout,

    #[error("forward.timeout_secs must be greater than zero when set")]
    ZeroForwardTimeout,

    #[error("auth.secret must not be empty")]
    EmptySecret,

    #[error("invalid auth header name '{0}'")]
    InvalidHeader(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }

    let privileged: Vec<usize> = config
        .backends
        .iter()
        .enumerate()
        .filter(|(_, b)| b.privileged)
        .map(|(i, _)| i)
        .collect();
    if privileged.len() > 1 {
        errors.push(ValidationError::MultiplePrivileged(privileged));
    }

    for (index, backend) in config.backends.iter().enumerate() {
        match Url::parse(&backend.url) {
            Ok(url) if url.scheme() != "http" => errors.push(ValidationError::UnsupportedScheme {
                index,
                scheme: url.scheme().to_string(),
            }),
            Ok(url) if url.host_str().is_none() => errors.push(ValidationError::InvalidBackendUrl {
                index,
                url: backend.url.clone(),
            }),
            Ok(_) => {}
            Err(_) => errors.push(ValidationError::InvalidBackendUrl {
                index,
                url: backend.url.clone(),
            }),
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.admin.enabled && config.admin.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.admin.bind_address.clone()));
    }

    if config.health_check.interval_secs == 0 {
        errors.push(ValidationError::ZeroInterval);
    }
    if config.health_check.timeout_secs == 0 {
        errors.push(ValidationError::ZeroProbeTimeout);
    }
    if config.forward.timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroForwardTimeout);
    }

    if config.auth.secret.is_empty() {
        errors.push(ValidationError::EmptySecret);
    }
    if HeaderName::from_bytes(config.auth.header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeader(config.auth.header.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
