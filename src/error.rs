//! Request-path error taxonomy and its HTTP mapping.
//!
//! | error                  | status | cause                                  |
//! |------------------------|--------|----------------------------------------|
//! | `AuthError`            | 401    | client sent a missing/bad credential   |
//! | `NoBackendAvailable`   | 503    | every eligible backend is down         |
//! | `ForwardError`         | 502    | chosen backend failed at transport     |

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::auth::{AuthError, Role};

/// The dispatcher could not pick a backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("no backend available for {role} request")]
    NoBackendAvailable { role: Role },
}

/// Forwarding to the chosen backend failed at the transport level.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("backend {index} unreachable: {source}")]
    Transport {
        index: usize,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    #[error("backend {index} did not respond within {after:?}")]
    Timeout { index: usize, after: Duration },

    #[error("cannot build request for backend {index}: {reason}")]
    BadTarget { index: usize, reason: String },
}

impl ForwardError {
    pub fn backend_index(&self) -> usize {
        match self {
            ForwardError::Transport { index, .. }
            | ForwardError::Timeout { index, .. }
            | ForwardError::BadTarget { index, .. } => *index,
        }
    }
}

/// Any failure surfaced to a client of the balancer.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Forward(#[from] ForwardError),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Auth(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Dispatch(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Forward(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = match &self {
            GatewayError::Auth(_) => "Invalid or missing JWT token".to_string(),
            GatewayError::Dispatch(_) => "No available backend servers".to_string(),
            GatewayError::Forward(e) => {
                format!("Backend server {} is not available", e.backend_index() + 1)
            }
        };
        (self.status(), body).into_response()
    }
}
