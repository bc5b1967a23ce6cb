//! Role-based dispatch.

use std::net::IpAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};

use crate::auth::Role;
use crate::error::{DispatchError, GatewayError};
use crate::http::Forwarder;
use crate::load_balancer::{
    Selector,
    backend::Backend,
    pinned::Pinned,
    pool::BackendPool,
    round_robin::RoundRobin,
};
use crate::observability::metrics;

/// Picks a backend per request and forwards to it.
pub struct Dispatcher {
    pool: Arc<BackendPool>,
    forwarder: Forwarder,
    pinned: Pinned,
    round_robin: RoundRobin,
}

impl Dispatcher {
    pub fn new(pool: Arc<BackendPool>, forwarder: Forwarder) -> Self {
        Self {
            pool,
            forwarder,
            pinned: Pinned::new(),
            round_robin: RoundRobin::new(),
        }
    }

    pub fn pool(&self) -> &Arc<BackendPool> {
        &self.pool
    }

    fn selector(&self, role: Role) -> &dyn Selector {
        if role.is_privileged() {
            &self.pinned
        } else {
            &self.round_robin
        }
    }

    /// Choose the backend for a request carrying `role`.
    ///
    /// On success the backend's served counter and the pool's dispatched
    /// counter are incremented before returning.
    pub fn route(&self, role: Role) -> Result<Arc<Backend>, DispatchError> {
        match self.selector(role).select(&self.pool) {
            Some(backend) => {
                self.pool.record_dispatch(backend.index);
                metrics::record_dispatch(&backend.label());
                tracing::debug!(
                    role = %role,
                    backend = %backend.label(),
                    "Request routed"
                );
                Ok(backend)
            }
            None => {
                if role.is_privileged() {
                    tracing::warn!(
                        backend = %self.pool.privileged().label(),
                        "Privileged request failed - privileged backend is down"
                    );
                } else {
                    tracing::warn!(role = %role, "No alive backend for request");
                }
                Err(DispatchError::NoBackendAvailable { role })
            }
        }
    }

    /// Route and forward a request. One attempt, no retry on another backend.
    pub async fn dispatch(
        &self,
        role: Role,
        request: Request<Body>,
        client_ip: Option<IpAddr>,
    ) -> Result<Response<Body>, GatewayError> {
        let backend = self.route(role)?;
        self.forwarder
            .forward(&backend, request, client_ip)
            .await
            .map_err(|e| {
                tracing::error!(backend = %backend.label(), error = %e, "Forwarding failed");
                GatewayError::from(e)
            })
    }
}
